use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};
use crate::types::ActorIdentity;

/// credential presented at the terminal once the upstream sign-in gate passed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffCredential {
    pub staff_id: String,
}

impl StaffCredential {
    pub fn new(staff_id: impl Into<String>) -> Self {
        Self {
            staff_id: staff_id.into(),
        }
    }
}

/// resolves a credential into an actor allowed to record payments
pub trait Authorizer: Send + Sync {
    fn authorize(&self, credential: &StaffCredential) -> Result<ActorIdentity>;
}

/// staff roles known to the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffRole {
    Administrator,
    Bursar,
    Accountant,
    Teacher,
}

impl StaffRole {
    pub fn can_process_payments(&self) -> bool {
        !matches!(self, StaffRole::Teacher)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub staff_id: String,
    pub name: String,
    pub role: StaffRole,
    pub active: bool,
}

/// allow-list of staff who may take payments
#[derive(Debug, Clone, Default)]
pub struct StaffRoster {
    staff: HashMap<String, StaffMember>,
}

impl StaffRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, staff_id: impl Into<String>, name: impl Into<String>, role: StaffRole) -> Self {
        self.add(StaffMember {
            staff_id: staff_id.into(),
            name: name.into(),
            role,
            active: true,
        });
        self
    }

    pub fn add(&mut self, member: StaffMember) {
        self.staff.insert(member.staff_id.clone(), member);
    }

    /// mark a member inactive, returns false when unknown
    pub fn deactivate(&mut self, staff_id: &str) -> bool {
        match self.staff.get_mut(staff_id) {
            Some(member) => {
                member.active = false;
                true
            }
            None => false,
        }
    }
}

impl Authorizer for StaffRoster {
    fn authorize(&self, credential: &StaffCredential) -> Result<ActorIdentity> {
        let staff_id = credential.staff_id.trim();
        if staff_id.is_empty() {
            return Err(LedgerError::MissingActor);
        }

        match self.staff.get(staff_id) {
            Some(member) if member.active && member.role.can_process_payments() => {
                Ok(ActorIdentity::new(member.staff_id.clone(), member.name.clone()))
            }
            _ => Err(LedgerError::Unauthorized {
                staff_id: staff_id.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> StaffRoster {
        StaffRoster::new()
            .with_member("STF-001", "Esi Bursar", StaffRole::Bursar)
            .with_member("STF-002", "Kojo Teacher", StaffRole::Teacher)
            .with_member("STF-003", "Adjoa Admin", StaffRole::Administrator)
    }

    #[test]
    fn test_authorized_staff_resolves_identity() {
        let actor = roster().authorize(&StaffCredential::new("STF-001")).unwrap();
        assert_eq!(actor, ActorIdentity::new("STF-001", "Esi Bursar"));
        assert!(actor.is_present());
    }

    #[test]
    fn test_rejections() {
        let mut roster = roster();
        assert_eq!(roster.authorize(&StaffCredential::new(" ")), Err(LedgerError::MissingActor));
        assert!(matches!(
            roster.authorize(&StaffCredential::new("STF-002")),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(matches!(
            roster.authorize(&StaffCredential::new("STF-404")),
            Err(LedgerError::Unauthorized { .. })
        ));

        assert!(roster.deactivate("STF-003"));
        assert!(!roster.deactivate("STF-404"));
        assert!(roster.authorize(&StaffCredential::new("STF-003")).is_err());
    }
}
