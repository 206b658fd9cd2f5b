//! Role state machine:
//!
//! ```text
//!   [Primary] --demote--> [Secondary]
//!   [Secondary] --promote--> [Primary]
//!   Terminal: none (process lifetime)
//! ```
//!
//! Only a primary accepts client-facing mutations. Role is configured at
//! construction and changed only via explicit promotion/demotion.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Secondary,
}

impl Role {
    pub fn is_primary(&self) -> bool {
        matches!(self, Role::Primary)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::Secondary => "secondary",
        }
    }
}
