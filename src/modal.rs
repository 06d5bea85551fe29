/// Keeps keyboard focus inside a fixed set of elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusTrap {
    len: usize,
    index: usize,
}

impl FocusTrap {
    /// `len` is clamped to at least one element.
    pub fn new(len: usize, initial: usize) -> Self {
        let len = len.max(1);
        FocusTrap {
            len,
            index: initial.min(len - 1),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.len;
    }

    pub fn previous(&mut self) {
        self.index = (self.index + self.len - 1) % self.len;
    }
}

/// What a confirmed modal does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTask(String),
    DeleteList(String),
    DeleteItem(String),
    DeleteAccount,
    SignOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalOutcome {
    Cancelled,
    Confirmed,
}

#[derive(Clone, Debug)]
pub struct ConfirmModal {
    pub title: String,
    pub message: String,
    pub action: ConfirmAction,
    focus: FocusTrap,
}

pub const CANCEL: usize = 0;
pub const CONFIRM: usize = 1;

impl ConfirmModal {
    /// Opens with Cancel focused so a stray Enter never confirms.
    pub fn new(title: impl Into<String>, message: impl Into<String>, action: ConfirmAction) -> Self {
        ConfirmModal {
            title: title.into(),
            message: message.into(),
            action,
            focus: FocusTrap::new(2, CANCEL),
        }
    }

    pub fn focused(&self) -> usize {
        self.focus.index()
    }

    pub fn focus_next(&mut self) {
        self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus.previous();
    }

    pub fn activate(&self) -> ModalOutcome {
        if self.focus.index() == CONFIRM {
            ModalOutcome::Confirmed
        } else {
            ModalOutcome::Cancelled
        }
    }
}
