use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{PaymentStatus, StudentId};

/// all events that can be emitted by the ledger service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // billing events
    StudentBilled {
        student_id: StudentId,
        category: String,
        new_bill: Money,
        tax_amount: Money,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentRecorded {
        student_id: StudentId,
        transaction_code: String,
        amount_paid: Money,
        current_balance: Money,
        status: PaymentStatus,
        staff_id: String,
        timestamp: DateTime<Utc>,
    },

    // clearance events
    FeesCleared {
        student_id: StudentId,
        credit: Money,
        timestamp: DateTime<Utc>,
    },
    ClearanceRevoked {
        student_id: StudentId,
        outstanding: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
