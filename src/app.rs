use crate::backend::{AuthBackend, DocumentStore, Session};
use crate::error::{ServiceError, ServiceResult};
use crate::modal::{ConfirmAction, ConfirmModal, FocusTrap, ModalOutcome};
use crate::models::{List, ListItem, NewTask, Task, UserDetails};
use crate::parser::parse_task_input;
use crate::pomodoro::Pomodoro;
use crate::preferences::{PreferenceStore, Preferences};
use crate::pricing::{PLANS, UPGRADE_URL};
use crate::reorder::{drop_index, move_item, placement_for, Optimistic, Placement};
use crate::services::user_service::name_from_email;
use crate::services::{AuthService, Workspace};
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use log::{info, warn};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Terminal rows taken by one list item; the lower row is the "after" half
/// when dragging.
pub const ITEM_HEIGHT: u16 = 2;
const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Tasks,
    Lists,
    Pomodoro,
    Settings,
    Pricing,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Dashboard,
        View::Tasks,
        View::Lists,
        View::Pomodoro,
        View::Settings,
        View::Pricing,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Tasks => "Tasks",
            View::Lists => "Lists",
            View::Pomodoro => "Pomodoro",
            View::Settings => "Settings",
            View::Pricing => "Upgrade",
        }
    }

    fn index(self) -> usize {
        View::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Content,
}

/// Which key map is active; drives the footer legend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    SignedOut,
    Normal,
    Editing,
    Modal,
    Grabbing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
    ResetPassword,
}

impl AuthMode {
    pub fn title(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign in",
            AuthMode::SignUp => "Create account",
            AuthMode::ResetPassword => "Reset password",
        }
    }

    fn field_count(self) -> usize {
        match self {
            AuthMode::SignIn => 2,
            AuthMode::SignUp => 3,
            AuthMode::ResetPassword => 1,
        }
    }

    fn next(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::ResetPassword,
            AuthMode::ResetPassword => AuthMode::SignIn,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub focus: FocusTrap,
}

impl Default for AuthForm {
    fn default() -> Self {
        AuthForm::new(AuthMode::SignIn)
    }
}

impl AuthForm {
    fn new(mode: AuthMode) -> Self {
        AuthForm {
            mode,
            email: String::new(),
            password: String::new(),
            confirm: String::new(),
            focus: FocusTrap::new(mode.field_count(), 0),
        }
    }

    fn switch_mode(&mut self) {
        let email = std::mem::take(&mut self.email);
        *self = AuthForm::new(self.mode.next());
        self.email = email;
    }

    fn active_field(&mut self) -> &mut String {
        match self.focus.index() {
            0 => &mut self.email,
            1 => &mut self.password,
            _ => &mut self.confirm,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveInput {
    Title,
    Description,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormKind {
    NewTask,
    EditTask(String),
    NewList,
    RenameList(String),
    NewItem,
    EditItem(String),
    EditName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Form {
    pub kind: FormKind,
    pub title: String,
    pub description: String,
    pub active: ActiveInput,
}

impl Form {
    fn new(kind: FormKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Form {
            kind,
            title: title.into(),
            description: description.into(),
            active: ActiveInput::Title,
        }
    }

    pub fn has_description(&self) -> bool {
        matches!(self.kind, FormKind::NewTask | FormKind::EditTask(_))
    }

    pub fn heading(&self) -> &'static str {
        match self.kind {
            FormKind::NewTask => "New task (@date ^time ~duration)",
            FormKind::EditTask(_) => "Edit task",
            FormKind::NewList => "New list",
            FormKind::RenameList(_) => "Rename list",
            FormKind::NewItem => "New item",
            FormKind::EditItem(_) => "Edit item",
            FormKind::EditName => "Display name",
        }
    }

    fn active_field(&mut self) -> &mut String {
        match self.active {
            ActiveInput::Title => &mut self.title,
            ActiveInput::Description => &mut self.description,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    created: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsEntry {
    Name,
    Avatar,
    Theme,
    Notifications,
    ResetPassword,
    SignOut,
    DeleteAccount,
}

impl SettingsEntry {
    pub const ALL: [SettingsEntry; 7] = [
        SettingsEntry::Name,
        SettingsEntry::Avatar,
        SettingsEntry::Theme,
        SettingsEntry::Notifications,
        SettingsEntry::ResetPassword,
        SettingsEntry::SignOut,
        SettingsEntry::DeleteAccount,
    ];
}

pub struct OpenList {
    pub list: List,
    pub items: Vec<ListItem>,
    pub state: ListState,
    /// Index of the item picked up for keyboard moves.
    pub grabbed: Option<usize>,
}

struct PendingReorder {
    list_id: String,
    change: Optimistic<Vec<ListItem>>,
    from: usize,
}

pub struct App {
    auth: AuthService,
    store: Arc<dyn DocumentStore>,
    workspace: Option<Workspace>,
    pref_store: PreferenceStore,
    pending_reorder: Option<PendingReorder>,
    pub session: Option<Session>,
    pub user: Option<UserDetails>,
    pub prefs: Preferences,
    pub demo: bool,
    pub view: View,
    pub focus: Focus,
    pub sidebar: ListState,
    pub auth_form: AuthForm,
    pub form: Option<Form>,
    pub modal: Option<ConfirmModal>,
    pub toasts: Vec<Toast>,
    pub tasks: Vec<Task>,
    pub task_state: ListState,
    pub task_detail: Option<Task>,
    pub show_archived: bool,
    pub lists: Vec<List>,
    pub list_state: ListState,
    pub open_list: Option<OpenList>,
    /// Item picked up with the mouse.
    pub drag: Option<usize>,
    pub drag_hover: Option<(usize, Placement)>,
    /// Screen area of the open list's items, recorded on every draw.
    pub item_area: Option<Rect>,
    pub pomodoro: Pomodoro,
    pub settings_state: ListState,
    pub pricing_state: ListState,
}

fn step(state: &mut ListState, len: usize, forward: bool) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = match state.selected() {
        Some(i) if forward => {
            if i >= len - 1 {
                0
            } else {
                i + 1
            }
        }
        Some(i) => {
            if i == 0 {
                len - 1
            } else {
                i - 1
            }
        }
        None => 0,
    };
    state.select(Some(i));
}

fn clamp_selection(state: &mut ListState, len: usize) {
    if len == 0 {
        state.select(None);
    } else {
        state.select(Some(state.selected().unwrap_or(0).min(len - 1)));
    }
}

fn selected_state() -> ListState {
    let mut state = ListState::default();
    state.select(Some(0));
    state
}

impl App {
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        store: Arc<dyn DocumentStore>,
        pref_store: PreferenceStore,
    ) -> App {
        let prefs = Preferences::load(&pref_store);
        let mut sidebar = ListState::default();
        sidebar.select(Some(0));
        App {
            auth: AuthService::new(auth, store.clone()),
            store,
            workspace: None,
            pref_store,
            pending_reorder: None,
            session: None,
            user: None,
            prefs,
            demo: false,
            view: View::Dashboard,
            focus: Focus::Content,
            sidebar,
            auth_form: AuthForm::default(),
            form: None,
            modal: None,
            toasts: Vec::new(),
            tasks: Vec::new(),
            task_state: ListState::default(),
            task_detail: None,
            show_archived: false,
            lists: Vec::new(),
            list_state: ListState::default(),
            open_list: None,
            drag: None,
            drag_hover: None,
            item_area: None,
            pomodoro: Pomodoro::new(),
            settings_state: selected_state(),
            pricing_state: selected_state(),
        }
    }

    pub fn input_mode(&self) -> InputMode {
        if self.modal.is_some() {
            InputMode::Modal
        } else if self.session.is_none() {
            InputMode::SignedOut
        } else if self.form.is_some() {
            InputMode::Editing
        } else if self
            .open_list
            .as_ref()
            .is_some_and(|open| open.grabbed.is_some())
            && self.view == View::Lists
        {
            InputMode::Grabbing
        } else {
            InputMode::Normal
        }
    }

    pub fn toast(&mut self, message: impl Into<String>) {
        self.toasts.push(Toast {
            message: message.into(),
            level: ToastLevel::Info,
            created: Instant::now(),
        });
    }

    fn report(&mut self, err: ServiceError) {
        warn!("event=action_failed err={}", err);
        self.toasts.push(Toast {
            message: err.user_message(),
            level: ToastLevel::Error,
            created: Instant::now(),
        });
    }

    /// Advances timers; called once per frame.
    pub fn tick(&mut self, elapsed: Duration) {
        let now = Instant::now();
        self.toasts
            .retain(|toast| now.duration_since(toast.created) < TOAST_TTL);

        if let Some(change) = self.pomodoro.tick(elapsed) {
            info!(
                "event=pomodoro_phase finished={:?} next={:?}",
                change.finished, change.next
            );
            if self.prefs.notifications {
                self.toast(format!(
                    "{} finished. Time for: {}",
                    change.finished.label(),
                    change.next.label()
                ));
            }
        }
    }

    fn save_prefs(&mut self) {
        if let Err(err) = self.prefs.save(&mut self.pref_store) {
            warn!("event=preferences_save_failed err={}", err);
            self.toasts.push(Toast {
                message: "Could not save preferences.".to_string(),
                level: ToastLevel::Error,
                created: Instant::now(),
            });
        }
    }

    // ---- session -------------------------------------------------------

    pub async fn submit_auth(&mut self) {
        let form = self.auth_form.clone();
        match form.mode {
            AuthMode::SignIn => match self.auth.sign_in(&form.email, &form.password).await {
                Ok(session) => self.start_session(session, None).await,
                Err(err) => self.report(err),
            },
            AuthMode::SignUp => {
                match self
                    .auth
                    .sign_up(&form.email, &form.password, &form.confirm)
                    .await
                {
                    Ok((session, details)) => self.start_session(session, Some(details)).await,
                    Err(err) => self.report(err),
                }
            }
            AuthMode::ResetPassword => match self.auth.send_password_reset(&form.email).await {
                Ok(()) => {
                    self.toast(format!("Password reset email sent to {}", form.email.trim()));
                    self.auth_form = AuthForm::new(AuthMode::SignIn);
                    self.auth_form.email = form.email;
                }
                Err(err) => self.report(err),
            },
        }
    }

    async fn start_session(&mut self, session: Session, details: Option<UserDetails>) {
        let workspace = Workspace::new(self.store.clone(), &session.uid);
        let details = match details {
            Some(details) => Ok(details),
            None => {
                workspace
                    .users
                    .ensure_details(&name_from_email(&session.email))
                    .await
            }
        };
        match details {
            Ok(details) => self.user = Some(details),
            Err(err) => self.report(err),
        }
        self.session = Some(session);
        self.workspace = Some(workspace);
        self.auth_form = AuthForm::default();
        self.select_view(View::Dashboard);
        self.focus = Focus::Content;
        self.refresh().await;
    }

    fn clear_session(&mut self) {
        self.session = None;
        self.workspace = None;
        self.user = None;
        self.tasks.clear();
        self.lists.clear();
        self.task_detail = None;
        self.open_list = None;
        self.pending_reorder = None;
        self.form = None;
        self.select_view(View::Dashboard);
    }

    pub async fn sign_out(&mut self) {
        if let Err(err) = self.auth.sign_out().await {
            self.report(err);
            return;
        }
        self.clear_session();
        self.toast("Signed out.");
    }

    /// Reloads tasks, lists and the open list from the backend.
    pub async fn refresh(&mut self) {
        let Some(ws) = self.workspace.clone() else {
            return;
        };
        match ws.tasks.all().await {
            Ok(mut tasks) => {
                self.prefs.sort_order.sort(&mut tasks);
                self.tasks = tasks;
                self.clamp_tasks();
            }
            Err(err) => self.report(err),
        }
        match ws.lists.lists().await {
            Ok(lists) => {
                self.lists = lists;
                clamp_selection(&mut self.list_state, self.lists.len());
            }
            Err(err) => self.report(err),
        }
        if let Some(id) = self.open_list.as_ref().map(|open| open.list.id.clone()) {
            self.open_list_by_id(&id).await;
        }
    }

    // ---- navigation ----------------------------------------------------

    pub fn select_view(&mut self, view: View) {
        self.view = view;
        self.sidebar.select(Some(view.index()));
        self.drag = None;
        self.drag_hover = None;
    }

    fn toggle_sidebar(&mut self) {
        self.prefs.sidebar_collapsed = !self.prefs.sidebar_collapsed;
        if self.prefs.sidebar_collapsed {
            self.focus = Focus::Content;
        }
        self.save_prefs();
    }

    pub async fn handle_input(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        match self.input_mode() {
            InputMode::Modal => {
                self.handle_modal_key(key).await;
                false
            }
            InputMode::SignedOut => self.handle_auth_key(key).await,
            InputMode::Editing => {
                self.handle_form_key(key).await;
                false
            }
            InputMode::Grabbing => {
                self.handle_grab_key(key);
                false
            }
            InputMode::Normal => self.handle_normal_key(key).await,
        }
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char(c @ '1'..='6') => {
                let index = c as usize - '1' as usize;
                self.select_view(View::ALL[index]);
            }
            KeyCode::Char('b') => self.toggle_sidebar(),
            KeyCode::Char('R') => self.refresh().await,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Sidebar => Focus::Content,
                    Focus::Content if !self.prefs.sidebar_collapsed => Focus::Sidebar,
                    Focus::Content => Focus::Content,
                };
            }
            _ if self.focus == Focus::Sidebar => self.handle_sidebar_key(key),
            _ => self.handle_content_key(key).await,
        }
        false
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => step(&mut self.sidebar, View::ALL.len(), true),
            KeyCode::Char('k') | KeyCode::Up => step(&mut self.sidebar, View::ALL.len(), false),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                let index = self.sidebar.selected().unwrap_or(0);
                self.select_view(View::ALL[index]);
                self.focus = Focus::Content;
            }
            _ => {}
        }
    }

    async fn handle_content_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Char('h') | KeyCode::Left)
            && !self.prefs.sidebar_collapsed
            && self.open_list.is_none()
        {
            self.focus = Focus::Sidebar;
            return;
        }
        match self.view {
            View::Dashboard => {
                if key.code == KeyCode::Char('r') {
                    self.refresh().await;
                }
            }
            View::Tasks => self.handle_tasks_key(key).await,
            View::Lists => {
                if self.open_list.is_some() {
                    self.handle_items_key(key).await;
                } else {
                    self.handle_lists_key(key).await;
                }
            }
            View::Pomodoro => match key.code {
                KeyCode::Char(' ') => self.pomodoro.toggle(),
                KeyCode::Char('r') => self.pomodoro.reset(),
                KeyCode::Char('n') => {
                    self.pomodoro.skip();
                }
                _ => {}
            },
            View::Settings => match key.code {
                KeyCode::Char('j') | KeyCode::Down => {
                    step(&mut self.settings_state, SettingsEntry::ALL.len(), true)
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    step(&mut self.settings_state, SettingsEntry::ALL.len(), false)
                }
                KeyCode::Enter => {
                    let index = self.settings_state.selected().unwrap_or(0);
                    self.activate_setting(SettingsEntry::ALL[index]).await;
                }
                _ => {}
            },
            View::Pricing => match key.code {
                KeyCode::Char('j') | KeyCode::Down => step(&mut self.pricing_state, PLANS.len(), true),
                KeyCode::Char('k') | KeyCode::Up => step(&mut self.pricing_state, PLANS.len(), false),
                KeyCode::Enter => {
                    let plan = PLANS[self.pricing_state.selected().unwrap_or(0)];
                    self.toast(format!(
                        "{} ({}) upgrades are completed at {}",
                        plan.name,
                        plan.price_label(),
                        UPGRADE_URL
                    ));
                }
                _ => {}
            },
        }
    }

    // ---- auth screen ---------------------------------------------------

    async fn handle_auth_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::F(2) => self.auth_form.switch_mode(),
            KeyCode::Tab | KeyCode::Down => self.auth_form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.auth_form.focus.previous(),
            KeyCode::Enter => self.submit_auth().await,
            KeyCode::Backspace => {
                self.auth_form.active_field().pop();
            }
            KeyCode::Char(c) => self.auth_form.active_field().push(c),
            _ => {}
        }
        false
    }

    // ---- forms ---------------------------------------------------------

    async fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Tab if form.has_description() => {
                form.active = match form.active {
                    ActiveInput::Title => ActiveInput::Description,
                    ActiveInput::Description => ActiveInput::Title,
                };
            }
            KeyCode::Enter => self.submit_form().await,
            KeyCode::Backspace => {
                form.active_field().pop();
            }
            KeyCode::Char(c) => form.active_field().push(c),
            _ => {}
        }
    }

    pub async fn submit_form(&mut self) {
        let Some(form) = self.form.take() else {
            return;
        };
        let Some(ws) = self.workspace.clone() else {
            return;
        };

        let result: ServiceResult<&'static str> = match &form.kind {
            FormKind::NewTask => {
                let parsed = parse_task_input(&form.title, Local::now().date_naive());
                let input = NewTask {
                    title: parsed.title,
                    description: form.description.clone(),
                    date: parsed.date,
                    time: parsed.time,
                    duration_minutes: parsed.duration_minutes,
                };
                ws.tasks.create(input).await.map(|task| {
                    self.upsert_task(task);
                    "Task added."
                })
            }
            FormKind::EditTask(id) => match self.tasks.iter().find(|t| &t.id == id).cloned() {
                Some(mut task) => {
                    task.title = form.title.clone();
                    task.description = form.description.clone();
                    ws.tasks.update(&task).await.map(|task| {
                        self.upsert_task(task);
                        "Task updated."
                    })
                }
                None => Err(ServiceError::NotFound {
                    kind: "task",
                    id: id.clone(),
                }),
            },
            FormKind::NewList => ws.lists.create_list(&form.title).await.map(|list| {
                self.lists.push(list);
                self.list_state.select(Some(self.lists.len() - 1));
                "List created."
            }),
            FormKind::RenameList(id) => ws.lists.rename_list(id, &form.title).await.map(|list| {
                if let Some(slot) = self.lists.iter_mut().find(|l| l.id == list.id) {
                    slot.name = list.name;
                }
                "List renamed."
            }),
            FormKind::NewItem => match self.open_list.as_ref().map(|open| open.list.id.clone()) {
                Some(list_id) => ws.lists.add_item(&list_id, &form.title).await.map(|item| {
                    if let Some(open) = self.open_list.as_mut() {
                        open.list.item_order.push(item.id.clone());
                        open.items.push(item);
                        open.state.select(Some(open.items.len() - 1));
                    }
                    "Item added."
                }),
                None => Ok(""),
            },
            FormKind::EditItem(id) => ws.lists.edit_item(id, &form.title).await.map(|item| {
                self.replace_item(item);
                "Item updated."
            }),
            FormKind::EditName => ws.users.update_name(&form.title).await.map(|name| {
                if let Some(user) = self.user.as_mut() {
                    user.name = name;
                }
                "Name updated."
            }),
        };

        match result {
            Ok("") => {}
            Ok(message) => self.toast(message),
            Err(err @ ServiceError::Validation(_)) => {
                self.report(err);
                self.form = Some(form);
            }
            Err(err) => self.report(err),
        }
    }

    // ---- tasks ---------------------------------------------------------

    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.archived == self.show_archived)
            .collect()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let index = self.task_state.selected()?;
        self.visible_tasks().get(index).copied()
    }

    fn clamp_tasks(&mut self) {
        let len = self.visible_tasks().len();
        clamp_selection(&mut self.task_state, len);
    }

    fn step_tasks(&mut self, forward: bool) {
        let len = self.visible_tasks().len();
        step(&mut self.task_state, len, forward);
    }

    fn upsert_task(&mut self, task: Task) {
        let id = task.id.clone();
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => self.tasks.push(task),
        }
        self.prefs.sort_order.sort(&mut self.tasks);
        if let Some(detail) = self.task_detail.as_mut().filter(|d| d.id == id) {
            if let Some(fresh) = self.tasks.iter().find(|t| t.id == id) {
                *detail = fresh.clone();
            }
        }
        let position = self.visible_tasks().iter().position(|t| t.id == id);
        match position {
            Some(index) => self.task_state.select(Some(index)),
            None => self.clamp_tasks(),
        }
    }

    async fn handle_tasks_key(&mut self, key: KeyEvent) {
        let Some(ws) = self.workspace.clone() else {
            return;
        };
        let selected = self.selected_task().cloned();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.step_tasks(true)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.step_tasks(false)
            }
            KeyCode::Char('a') => self.form = Some(Form::new(FormKind::NewTask, "", "")),
            KeyCode::Char('s') => {
                self.prefs.sort_order = self.prefs.sort_order.next();
                self.prefs.sort_order.sort(&mut self.tasks);
                self.save_prefs();
                self.toast(format!("Sorted by {}", self.prefs.sort_order.as_str()));
            }
            KeyCode::Char('v') => {
                self.show_archived = !self.show_archived;
                self.task_detail = None;
                self.clamp_tasks();
            }
            _ => {}
        }

        let Some(task) = selected else {
            return;
        };
        match key.code {
            KeyCode::Enter => match ws.tasks.get(&task.id).await {
                Ok(fresh) => {
                    self.task_detail = Some(fresh.clone());
                    self.upsert_task(fresh);
                }
                Err(err) => self.report(err),
            },
            KeyCode::Char('e') => {
                self.form = Some(Form::new(
                    FormKind::EditTask(task.id.clone()),
                    task.title.clone(),
                    task.description.clone(),
                ));
            }
            KeyCode::Char('x') | KeyCode::Char(' ') => match ws.tasks.toggle_complete(&task.id).await {
                Ok(updated) => self.upsert_task(updated),
                Err(err) => self.report(err),
            },
            KeyCode::Char('A') => match ws.tasks.set_archived(&task.id, !task.archived).await {
                Ok(updated) => {
                    let message = if updated.archived {
                        "Task archived."
                    } else {
                        "Task restored."
                    };
                    self.upsert_task(updated);
                    self.toast(message);
                }
                Err(err) => self.report(err),
            },
            KeyCode::Char('d') => {
                self.modal = Some(ConfirmModal::new(
                    "Delete task",
                    format!("Delete \"{}\"? This cannot be undone.", task.title),
                    ConfirmAction::DeleteTask(task.id.clone()),
                ));
            }
            _ => {}
        }
    }

    // ---- lists ---------------------------------------------------------

    async fn handle_lists_key(&mut self, key: KeyEvent) {
        let selected = self
            .list_state
            .selected()
            .and_then(|i| self.lists.get(i))
            .cloned();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => step(&mut self.list_state, self.lists.len(), true),
            KeyCode::Char('k') | KeyCode::Up => step(&mut self.list_state, self.lists.len(), false),
            KeyCode::Char('a') => self.form = Some(Form::new(FormKind::NewList, "", "")),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                if let Some(list) = selected {
                    self.open_list_by_id(&list.id).await;
                }
            }
            KeyCode::Char('r') => {
                if let Some(list) = selected {
                    self.form = Some(Form::new(FormKind::RenameList(list.id), list.name, ""));
                }
            }
            KeyCode::Char('d') => {
                if let Some(list) = selected {
                    self.modal = Some(ConfirmModal::new(
                        "Delete list",
                        format!("Delete \"{}\" and all of its items?", list.name),
                        ConfirmAction::DeleteList(list.id),
                    ));
                }
            }
            _ => {}
        }
    }

    pub async fn open_list_by_id(&mut self, id: &str) {
        let Some(ws) = self.workspace.clone() else {
            return;
        };
        let loaded = match ws.lists.get_list(id).await {
            Ok(list) => ws.lists.items(id).await.map(|items| (list, items)),
            Err(err) => Err(err),
        };
        match loaded {
            Ok((list, items)) => {
                let mut state = ListState::default();
                let previous = self
                    .open_list
                    .as_ref()
                    .filter(|open| open.list.id == list.id)
                    .and_then(|open| open.state.selected());
                state.select(previous.or(Some(0)));
                clamp_selection(&mut state, items.len());
                self.open_list = Some(OpenList {
                    list,
                    items,
                    state,
                    grabbed: None,
                });
            }
            Err(err) => {
                self.open_list = None;
                self.report(err);
            }
        }
    }

    fn replace_item(&mut self, item: ListItem) {
        if let Some(open) = self.open_list.as_mut() {
            if let Some(slot) = open.items.iter_mut().find(|i| i.id == item.id) {
                *slot = item;
            }
        }
    }

    fn selected_item(&self) -> Option<(usize, &ListItem)> {
        let open = self.open_list.as_ref()?;
        let index = open.state.selected()?;
        open.items.get(index).map(|item| (index, item))
    }

    async fn handle_items_key(&mut self, key: KeyEvent) {
        let Some(ws) = self.workspace.clone() else {
            return;
        };
        let len = self.open_list.as_ref().map_or(0, |open| open.items.len());
        let selected = self.selected_item().map(|(i, item)| (i, item.clone()));

        match key.code {
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => {
                self.open_list = None;
                return;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(open) = self.open_list.as_mut() {
                    step(&mut open.state, len, true);
                }
                return;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(open) = self.open_list.as_mut() {
                    step(&mut open.state, len, false);
                }
                return;
            }
            KeyCode::Char('a') => {
                self.form = Some(Form::new(FormKind::NewItem, "", ""));
                return;
            }
            _ => {}
        }

        let Some((index, item)) = selected else {
            return;
        };
        match key.code {
            KeyCode::Char('x') | KeyCode::Char(' ') => match ws.lists.toggle_item(&item.id).await {
                Ok(updated) => self.replace_item(updated),
                Err(err) => self.report(err),
            },
            KeyCode::Char('e') => {
                self.form = Some(Form::new(FormKind::EditItem(item.id.clone()), item.text, ""));
            }
            KeyCode::Char('d') => {
                self.modal = Some(ConfirmModal::new(
                    "Delete item",
                    format!("Delete \"{}\"?", item.text),
                    ConfirmAction::DeleteItem(item.id),
                ));
            }
            KeyCode::Char('m') => {
                if let Some(open) = self.open_list.as_mut() {
                    open.grabbed = Some(index);
                }
            }
            KeyCode::Char('J') => {
                self.move_open_item(index, index + 1);
            }
            KeyCode::Char('K') if index > 0 => {
                self.move_open_item(index, index - 1);
            }
            _ => {}
        }
    }

    fn handle_grab_key(&mut self, key: KeyEvent) {
        let Some(index) = self.open_list.as_ref().and_then(|open| open.grabbed) else {
            return;
        };
        match key.code {
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Char('J') => {
                self.move_open_item(index, index + 1);
            }
            KeyCode::Char('k') | KeyCode::Up | KeyCode::Char('K') if index > 0 => {
                self.move_open_item(index, index - 1);
            }
            KeyCode::Char('m') | KeyCode::Enter | KeyCode::Esc => {
                if let Some(open) = self.open_list.as_mut() {
                    open.grabbed = None;
                }
            }
            _ => {}
        }
    }

    /// Moves an item in the open list on screen right away and queues the
    /// new order for [`App::flush_pending`]. Only one reorder is in flight.
    pub fn move_open_item(&mut self, from: usize, to: usize) -> bool {
        if self.pending_reorder.is_some() {
            return false;
        }
        let Some(open) = self.open_list.as_mut() else {
            return false;
        };
        if from == to || from >= open.items.len() || to >= open.items.len() {
            return false;
        }
        let change = Optimistic::apply(&mut open.items, |items| {
            move_item(items, from, to);
        });
        open.state.select(Some(to));
        if open.grabbed.is_some() {
            open.grabbed = Some(to);
        }
        self.pending_reorder = Some(PendingReorder {
            list_id: open.list.id.clone(),
            change,
            from,
        });
        true
    }

    pub fn has_pending_reorder(&self) -> bool {
        self.pending_reorder.is_some()
    }

    /// Persists a queued reorder; on failure the list goes back to exactly
    /// what was shown before the move.
    pub async fn flush_pending(&mut self) {
        let Some(pending) = self.pending_reorder.take() else {
            return;
        };
        let Some(ws) = self.workspace.clone() else {
            return;
        };
        let ids: Vec<String> = match &self.open_list {
            Some(open) if open.list.id == pending.list_id => {
                open.items.iter().map(|item| item.id.clone()).collect()
            }
            _ => return,
        };

        let outcome = ws.lists.reorder_items(&pending.list_id, &ids).await;

        let list_id = pending.list_id;
        let Some(open) = self.open_list.as_mut().filter(|open| open.list.id == list_id) else {
            return;
        };
        match pending.change.settle(&mut open.items, outcome) {
            Ok(()) => {
                open.list.item_order = ids.clone();
                if let Some(list) = self.lists.iter_mut().find(|l| l.id == list_id) {
                    list.item_order = ids;
                }
            }
            Err(err) => {
                open.state.select(Some(pending.from));
                if open.grabbed.is_some() {
                    open.grabbed = Some(pending.from);
                }
                warn!("event=reorder_rollback list={} err={}", list_id, err);
                self.report(err);
            }
        }
    }

    // ---- mouse drag ----------------------------------------------------

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.view != View::Lists || self.input_mode() != InputMode::Normal {
            return;
        }
        let Some(area) = self.item_area else {
            return;
        };
        let hit = self.item_at(area, mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some((index, _)) = hit {
                    self.drag = Some(index);
                    if let Some(open) = self.open_list.as_mut() {
                        open.state.select(Some(index));
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.drag.is_some() {
                    self.drag_hover = hit.or(self.drag_hover);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let source = self.drag.take();
                let target = hit.or(self.drag_hover.take());
                self.drag_hover = None;
                if let (Some(source), Some((target, placement))) = (source, target) {
                    self.move_open_item(source, drop_index(source, target, placement));
                }
            }
            _ => {}
        }
    }

    fn item_at(&self, area: Rect, column: u16, row: u16) -> Option<(usize, Placement)> {
        let open = self.open_list.as_ref()?;
        let inside = column >= area.x
            && column < area.x.saturating_add(area.width)
            && row >= area.y
            && row < area.y.saturating_add(area.height);
        if !inside {
            return None;
        }
        let slot = (row - area.y) / ITEM_HEIGHT;
        let index = open.state.offset() + usize::from(slot);
        if index >= open.items.len() {
            return None;
        }
        let top = area.y + slot * ITEM_HEIGHT;
        let placement = placement_for(
            f64::from(row) + 0.5,
            f64::from(top),
            f64::from(ITEM_HEIGHT),
        );
        Some((index, placement))
    }

    // ---- modal ---------------------------------------------------------

    async fn handle_modal_key(&mut self, key: KeyEvent) {
        let Some(modal) = self.modal.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => modal.focus_next(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => modal.focus_previous(),
            KeyCode::Esc => self.modal = None,
            KeyCode::Enter => {
                let outcome = modal.activate();
                let action = modal.action.clone();
                self.modal = None;
                if outcome == ModalOutcome::Confirmed {
                    self.run_confirmed(action).await;
                }
            }
            _ => {}
        }
    }

    async fn run_confirmed(&mut self, action: ConfirmAction) {
        let Some(ws) = self.workspace.clone() else {
            return;
        };
        match action {
            ConfirmAction::DeleteTask(id) => match ws.tasks.delete(&id).await {
                Ok(()) => {
                    self.tasks.retain(|t| t.id != id);
                    if self.task_detail.as_ref().is_some_and(|d| d.id == id) {
                        self.task_detail = None;
                    }
                    self.clamp_tasks();
                    self.toast("Task deleted.");
                }
                Err(err) => self.report(err),
            },
            ConfirmAction::DeleteList(id) => match ws.lists.delete_list(&id).await {
                Ok(()) => {
                    self.lists.retain(|l| l.id != id);
                    if self.open_list.as_ref().is_some_and(|o| o.list.id == id) {
                        self.open_list = None;
                    }
                    clamp_selection(&mut self.list_state, self.lists.len());
                    self.toast("List deleted.");
                }
                Err(err) => self.report(err),
            },
            ConfirmAction::DeleteItem(id) => match ws.lists.delete_item(&id).await {
                Ok(()) => {
                    if let Some(open) = self.open_list.as_mut() {
                        open.items.retain(|i| i.id != id);
                        open.list.item_order.retain(|i| *i != id);
                        clamp_selection(&mut open.state, open.items.len());
                    }
                }
                Err(err) => self.report(err),
            },
            ConfirmAction::DeleteAccount => {
                let Some(session) = self.session.clone() else {
                    return;
                };
                match self.auth.delete_account(&session).await {
                    Ok(()) => {
                        self.clear_session();
                        self.toast("Your account has been deleted.");
                    }
                    Err(err) => self.report(err),
                }
            }
            ConfirmAction::SignOut => self.sign_out().await,
        }
    }

    // ---- settings ------------------------------------------------------

    pub fn setting_value(&self, entry: SettingsEntry) -> String {
        match entry {
            SettingsEntry::Name => self
                .user
                .as_ref()
                .map(|u| u.name.clone())
                .unwrap_or_default(),
            SettingsEntry::Avatar => self
                .user
                .as_ref()
                .map(|u| u.avatar_name().to_string())
                .unwrap_or_default(),
            SettingsEntry::Theme => self.prefs.theme.as_str().to_string(),
            SettingsEntry::Notifications => {
                let state = if self.prefs.notifications { "on" } else { "off" };
                state.to_string()
            }
            SettingsEntry::ResetPassword => self
                .session
                .as_ref()
                .map(|s| s.email.clone())
                .unwrap_or_default(),
            SettingsEntry::SignOut | SettingsEntry::DeleteAccount => String::new(),
        }
    }

    pub async fn activate_setting(&mut self, entry: SettingsEntry) {
        let Some(ws) = self.workspace.clone() else {
            return;
        };
        match entry {
            SettingsEntry::Name => {
                let name = self.setting_value(SettingsEntry::Name);
                self.form = Some(Form::new(FormKind::EditName, name, ""));
            }
            SettingsEntry::Avatar => {
                let next = self.user.as_ref().map_or(0, |u| u.avatar + 1);
                match ws.users.set_avatar(next).await {
                    Ok(avatar) => {
                        if let Some(user) = self.user.as_mut() {
                            user.avatar = avatar;
                        }
                    }
                    Err(err) => self.report(err),
                }
            }
            SettingsEntry::Theme => {
                self.prefs.theme = self.prefs.theme.toggle();
                self.save_prefs();
            }
            SettingsEntry::Notifications => {
                self.prefs.notifications = !self.prefs.notifications;
                self.save_prefs();
            }
            SettingsEntry::ResetPassword => {
                let email = self.setting_value(SettingsEntry::ResetPassword);
                match self.auth.send_password_reset(&email).await {
                    Ok(()) => self.toast(format!("Password reset email sent to {email}")),
                    Err(err) => self.report(err),
                }
            }
            SettingsEntry::SignOut => {
                self.modal = Some(ConfirmModal::new(
                    "Sign out",
                    "Sign out of Noted?",
                    ConfirmAction::SignOut,
                ));
            }
            SettingsEntry::DeleteAccount => {
                self.modal = Some(ConfirmModal::new(
                    "Delete account",
                    "Permanently delete your account, tasks and lists?",
                    ConfirmAction::DeleteAccount,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use crate::backend::SessionHandle;
    use crossterm::event::{KeyEventKind, KeyEventState};

    const EMAIL: &str = "ada@example.com";
    const PASSWORD: &str = "secret1";

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_input(key(KeyCode::Char(c))).await;
        }
    }

    async fn signed_in_app() -> (App, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new(Arc::new(SessionHandle::default())));
        backend.register(EMAIL, PASSWORD).unwrap();
        let mut app = App::new(backend.clone(), backend.clone(), PreferenceStore::in_memory());
        type_text(&mut app, EMAIL).await;
        app.handle_input(key(KeyCode::Tab)).await;
        type_text(&mut app, PASSWORD).await;
        app.handle_input(key(KeyCode::Enter)).await;
        assert!(app.session.is_some(), "sign-in failed: {:?}", app.toasts);
        (app, backend)
    }

    async fn app_with_open_list(texts: &[&str]) -> (App, Arc<MemoryBackend>) {
        let (mut app, backend) = signed_in_app().await;
        let ws = app.workspace.clone().unwrap();
        let list = ws.lists.create_list("Packing").await.unwrap();
        for text in texts {
            ws.lists.add_item(&list.id, text).await.unwrap();
        }
        app.select_view(View::Lists);
        app.open_list_by_id(&list.id).await;
        (app, backend)
    }

    fn open_texts(app: &App) -> Vec<String> {
        app.open_list
            .as_ref()
            .unwrap()
            .items
            .iter()
            .map(|i| i.text.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_sign_in_loads_profile() {
        let (app, _) = signed_in_app().await;
        assert_eq!(app.user.as_ref().map(|u| u.name.as_str()), Some("ada"));
        assert_eq!(app.input_mode(), InputMode::Normal);
        assert_eq!(app.view, View::Dashboard);
    }

    #[tokio::test]
    async fn test_wrong_password_shows_static_message() {
        let backend = Arc::new(MemoryBackend::new(Arc::new(SessionHandle::default())));
        backend.register(EMAIL, PASSWORD).unwrap();
        let mut app = App::new(backend.clone(), backend, PreferenceStore::in_memory());
        type_text(&mut app, EMAIL).await;
        app.handle_input(key(KeyCode::Tab)).await;
        type_text(&mut app, "wrong!!").await;
        app.handle_input(key(KeyCode::Enter)).await;

        assert!(app.session.is_none());
        let toast = app.toasts.last().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, "Invalid email or password.");
    }

    #[tokio::test]
    async fn test_quick_add_task() {
        let (mut app, _) = signed_in_app().await;
        app.handle_input(key(KeyCode::Char('2'))).await;
        assert_eq!(app.view, View::Tasks);
        app.handle_input(key(KeyCode::Char('a'))).await;
        assert_eq!(app.input_mode(), InputMode::Editing);
        type_text(&mut app, "Stretch ~10m").await;
        app.handle_input(key(KeyCode::Enter)).await;

        assert_eq!(app.input_mode(), InputMode::Normal);
        let task = app.selected_task().unwrap();
        assert_eq!(task.title, "Stretch");
        assert_eq!(task.duration_minutes, Some(10));
        assert!(!task.completed);
    }

    #[tokio::test]
    async fn test_blank_task_keeps_form_open() {
        let (mut app, _) = signed_in_app().await;
        app.select_view(View::Tasks);
        app.handle_input(key(KeyCode::Char('a'))).await;
        type_text(&mut app, "   ").await;
        app.handle_input(key(KeyCode::Enter)).await;
        assert_eq!(app.input_mode(), InputMode::Editing);
        assert_eq!(app.toasts.last().unwrap().message, "Task title cannot be empty.");
    }

    #[tokio::test]
    async fn test_archive_hides_task() {
        let (mut app, _) = signed_in_app().await;
        app.select_view(View::Tasks);
        app.handle_input(key(KeyCode::Char('a'))).await;
        type_text(&mut app, "Old chore").await;
        app.handle_input(key(KeyCode::Enter)).await;

        app.handle_input(key(KeyCode::Char('A'))).await;
        assert!(app.visible_tasks().is_empty());
        app.handle_input(key(KeyCode::Char('v'))).await;
        assert_eq!(app.visible_tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_task_needs_confirmation() {
        let (mut app, _) = signed_in_app().await;
        app.select_view(View::Tasks);
        app.handle_input(key(KeyCode::Char('a'))).await;
        type_text(&mut app, "Temp").await;
        app.handle_input(key(KeyCode::Enter)).await;

        app.handle_input(key(KeyCode::Char('d'))).await;
        assert_eq!(app.input_mode(), InputMode::Modal);
        app.handle_input(key(KeyCode::Enter)).await;
        assert_eq!(app.tasks.len(), 1, "Enter on Cancel must not delete");

        app.handle_input(key(KeyCode::Char('d'))).await;
        app.handle_input(key(KeyCode::Tab)).await;
        app.handle_input(key(KeyCode::Enter)).await;
        assert!(app.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_keyboard_reorder_persists() {
        let (mut app, _) = app_with_open_list(&["tent", "stove", "map"]).await;
        app.handle_input(key(KeyCode::Char('m'))).await;
        assert_eq!(app.input_mode(), InputMode::Grabbing);
        app.handle_input(key(KeyCode::Char('j'))).await;

        assert_eq!(open_texts(&app), vec!["stove", "tent", "map"]);
        assert!(app.has_pending_reorder());
        app.flush_pending().await;
        assert!(!app.has_pending_reorder());

        let list_id = app.open_list.as_ref().unwrap().list.id.clone();
        app.open_list_by_id(&list_id).await;
        assert_eq!(open_texts(&app), vec!["stove", "tent", "map"]);
    }

    #[tokio::test]
    async fn test_failed_reorder_rolls_back() {
        let (mut app, backend) = app_with_open_list(&["a", "b", "c", "d"]).await;
        let before = open_texts(&app);

        backend.fail_writes(true);
        assert!(app.move_open_item(0, 3));
        assert_eq!(open_texts(&app), vec!["b", "c", "d", "a"]);
        app.flush_pending().await;

        assert_eq!(open_texts(&app), before);
        assert_eq!(app.open_list.as_ref().unwrap().state.selected(), Some(0));
        assert_eq!(app.toasts.last().unwrap().level, ToastLevel::Error);

        backend.fail_writes(false);
        let list_id = app.open_list.as_ref().unwrap().list.id.clone();
        app.open_list_by_id(&list_id).await;
        assert_eq!(open_texts(&app), before);
    }

    #[tokio::test]
    async fn test_move_to_same_index_is_noop() {
        let (mut app, _) = app_with_open_list(&["a", "b"]).await;
        assert!(!app.move_open_item(1, 1));
        assert!(!app.has_pending_reorder());
    }

    #[tokio::test]
    async fn test_mouse_drag_uses_midpoint() {
        let (mut app, _) = app_with_open_list(&["a", "b", "c"]).await;
        app.item_area = Some(Rect::new(10, 5, 30, 6));
        let mouse = |kind, row| MouseEvent {
            kind,
            column: 12,
            row,
            modifiers: KeyModifiers::NONE,
        };

        // grab "a" (rows 5-6) and drop on the lower half of "c" (rows 9-10)
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 5));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 10));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 10));
        assert_eq!(open_texts(&app), vec!["b", "c", "a"]);
        app.flush_pending().await;

        // grab "a" again and drop on the upper half of "c" (row 7 now)
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 9));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 7));
        assert_eq!(open_texts(&app), vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_sidebar_preference_persists_in_store() {
        let (mut app, _) = signed_in_app().await;
        app.handle_input(key(KeyCode::Char('b'))).await;
        assert!(app.prefs.sidebar_collapsed);
        assert_eq!(
            app.pref_store.get(crate::preferences::SIDEBAR_COLLAPSED),
            Some("true")
        );
    }

    #[tokio::test]
    async fn test_delete_account_signs_out() {
        let (mut app, _) = signed_in_app().await;
        app.select_view(View::Settings);
        app.activate_setting(SettingsEntry::DeleteAccount).await;
        app.handle_input(key(KeyCode::Right)).await;
        app.handle_input(key(KeyCode::Enter)).await;
        assert!(app.session.is_none());
        assert_eq!(app.input_mode(), InputMode::SignedOut);
    }

    #[tokio::test]
    async fn test_pomodoro_notification_toast() {
        let (mut app, _) = signed_in_app().await;
        app.toasts.clear();
        app.pomodoro.start();
        app.tick(crate::pomodoro::FOCUS);
        assert_eq!(app.toasts.len(), 1);

        app.prefs.notifications = false;
        app.pomodoro.start();
        app.tick(crate::pomodoro::SHORT_BREAK);
        assert_eq!(app.toasts.len(), 1);
    }
}
