//! Static checklist definition
//!
//! The register routine is a fixed ordered sequence of 20 steps: items 1-15
//! cover the opening shift, items 16-20 cover closing. The table is a
//! process-wide constant; nothing mutates it at runtime. Item ids encode the
//! execution order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Checklist section tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Opening,
    Closing,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Opening => write!(f, "Opening"),
            Section::Closing => write!(f, "Closing"),
        }
    }
}

/// One step of the register routine
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChecklistItem {
    /// 1-based position in the routine (ordering is significant)
    pub id: u16,
    pub label: &'static str,
    pub section: Section,
}

/// The full register routine, in execution order
pub static CHECKLIST_ITEMS: &[ChecklistItem] = &[
    // Opening
    ChecklistItem { id: 1, label: "Power on the register computer", section: Section::Opening },
    ChecklistItem { id: 2, label: "Sign in to the POS system", section: Section::Opening },
    ChecklistItem { id: 3, label: "Check the store messaging inbox", section: Section::Opening },
    ChecklistItem { id: 4, label: "Check receipt rolls, clips, staples and card terminals", section: Section::Opening },
    ChecklistItem { id: 5, label: "Open the cash drawer for the day", section: Section::Opening },
    ChecklistItem { id: 6, label: "Collect the change float from the office", section: Section::Opening },
    ChecklistItem { id: 7, label: "Count the change float and confirm the amount is correct", section: Section::Opening },
    ChecklistItem { id: 8, label: "Enter the exact float amount into the POS", section: Section::Opening },
    ChecklistItem { id: 9, label: "Print or request the order slip", section: Section::Opening },
    ChecklistItem { id: 10, label: "Ask the customer for their payment method", section: Section::Opening },
    ChecklistItem { id: 11, label: "Close each order with its payment method and receipt; hand back change on cash payments", section: Section::Opening },
    ChecklistItem { id: 12, label: "Release the daily security payment against a receipt signed by the guard and the supervisor", section: Section::Opening },
    ChecklistItem { id: 13, label: "Record every cash withdrawal in the POS as an expense signed by the supervisor", section: Section::Opening },
    ChecklistItem { id: 14, label: "Collect signatures on trade and staff order slips and file them with the register paperwork", section: Section::Opening },
    ChecklistItem { id: 15, label: "Apply the courtesy discount only on presentation of a valid badge", section: Section::Opening },
    // Closing
    ChecklistItem { id: 16, label: "Separate order slips by payment method, print the terminal report and reconcile each total against it", section: Section::Closing },
    ChecklistItem { id: 17, label: "Enter all totals into the POS and print the closing report", section: Section::Closing },
    ChecklistItem { id: 18, label: "Bag slips, cash, invoices and reports and store the bag in the office drawer", section: Section::Closing },
    ChecklistItem { id: 19, label: "Tidy the register, put the card terminals on charge, take out the trash and shut down the computers", section: Section::Closing },
    ChecklistItem { id: 20, label: "Answer all pending messages and calls from the shift", section: Section::Closing },
];

/// Total number of checklist items
pub fn total_item_count() -> usize {
    CHECKLIST_ITEMS.len()
}

/// Whether `id` names an item of the static routine
pub fn is_valid_item(id: u16) -> bool {
    CHECKLIST_ITEMS.iter().any(|item| item.id == id)
}

/// Item ids belonging to one section, in routine order
pub fn section_item_ids(section: Section) -> Vec<u16> {
    CHECKLIST_ITEMS
        .iter()
        .filter(|item| item.section == section)
        .map(|item| item.id)
        .collect()
}
