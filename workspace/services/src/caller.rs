use common::Role;

/// The authenticated user of a request, tagged by the role that scopes what
/// they may see. Resolved once at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Admin { user_id: i32 },
    Faculty { user_id: i32 },
    Student { user_id: i32 },
}

impl Caller {
    /// Picks the strongest role a user holds: Admin, then Faculty, then
    /// Student. Guests get no caller.
    pub fn from_roles(user_id: i32, roles: &[Role]) -> Option<Caller> {
        if roles.contains(&Role::Admin) {
            Some(Caller::Admin { user_id })
        } else if roles.contains(&Role::Faculty) {
            Some(Caller::Faculty { user_id })
        } else if roles.contains(&Role::Student) {
            Some(Caller::Student { user_id })
        } else {
            None
        }
    }

    pub fn user_id(&self) -> i32 {
        match *self {
            Caller::Admin { user_id } | Caller::Faculty { user_id } | Caller::Student { user_id } => {
                user_id
            }
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Caller::Admin { .. } => Role::Admin,
            Caller::Faculty { .. } => Role::Faculty,
            Caller::Student { .. } => Role::Student,
        }
    }
}
