/// Where plan changes are completed; the terminal app only shows the catalogue.
pub const UPGRADE_URL: &str = "https://noted.app/pricing";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Billing {
    Free,
    Monthly,
    Yearly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Plan {
    pub name: &'static str,
    pub billing: Billing,
    pub price_cents: u32,
    pub features: &'static [&'static str],
}

const FREE_FEATURES: &[&str] = &[
    "Unlimited tasks",
    "Up to 3 lists",
    "Pomodoro timer",
];

const PRO_FEATURES: &[&str] = &[
    "Everything in Free",
    "Unlimited lists",
    "Habit and goal tracking",
    "Priority support",
];

pub const PLANS: [Plan; 3] = [
    Plan {
        name: "Free",
        billing: Billing::Free,
        price_cents: 0,
        features: FREE_FEATURES,
    },
    Plan {
        name: "Pro",
        billing: Billing::Monthly,
        price_cents: 499,
        features: PRO_FEATURES,
    },
    Plan {
        name: "Pro",
        billing: Billing::Yearly,
        price_cents: 3999,
        features: PRO_FEATURES,
    },
];

impl Plan {
    pub fn price_label(&self) -> String {
        let amount = format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100);
        match self.billing {
            Billing::Free => "Free forever".to_string(),
            Billing::Monthly => format!("{amount} / month"),
            Billing::Yearly => format!("{amount} / year"),
        }
    }

    /// Savings of yearly billing against twelve monthly payments, in whole percent.
    pub fn yearly_savings_percent(monthly: &Plan, yearly: &Plan) -> u32 {
        let twelve = monthly.price_cents * 12;
        if twelve == 0 || yearly.price_cents >= twelve {
            return 0;
        }
        (twelve - yearly.price_cents) * 100 / twelve
    }
}
