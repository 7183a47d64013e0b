//! User accounts and permission roles.
//!
//! The original data model had two record variants sharing one field
//! layout: a regular user and a moderator. The save format tags each user
//! record with a role discriminant so the reader knows which variant to
//! reconstruct; in memory the two are a closed tagged variant over the same
//! profile.

use std::fmt;

/// Permission role of an account.
///
/// The numeric values are the wire discriminant: a signed 32-bit integer
/// at the head (and tail) of every serialized user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Role {
    /// Invalid or unset role; appears only in files, never assigned live.
    Nan = -1,
    /// Regular user.
    User = 0,
    /// Moderator; may remove topics, discussions, and others' comments.
    Mod = 1,
}

impl Role {
    /// Converts the role to its wire discriminant.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Converts a wire discriminant to a role.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            -1 => Some(Self::Nan),
            0 => Some(Self::User),
            1 => Some(Self::Mod),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Nan => write!(f, "none"),
            Role::User => write!(f, "user"),
            Role::Mod => write!(f, "moderator"),
        }
    }
}

/// The field set shared by both account variants.
#[derive(Clone, PartialEq, Eq)]
pub struct Profile {
    first_name: String,
    last_name: String,
    nickname: String,
    password: String,
    id: u32,
    points: i32,
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // password intentionally omitted
        f.debug_struct("Profile")
            .field("id", &self.id)
            .field("nickname", &self.nickname)
            .field("points", &self.points)
            .finish()
    }
}

impl Profile {
    /// Creates a profile with zero points.
    pub fn new(
        first_name: String,
        last_name: String,
        nickname: String,
        password: String,
        id: u32,
    ) -> Self {
        Self {
            first_name,
            last_name,
            nickname,
            password,
            id,
            points: 0,
        }
    }

    /// Rebuilds a profile from loaded fields.
    pub fn from_parts(
        first_name: String,
        last_name: String,
        nickname: String,
        password: String,
        id: u32,
        points: i32,
    ) -> Self {
        Self {
            first_name,
            last_name,
            nickname,
            password,
            id,
            points,
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn points(&self) -> i32 {
        self.points
    }

    pub fn set_first_name(&mut self, first_name: String) {
        self.first_name = first_name;
    }

    pub fn set_last_name(&mut self, last_name: String) {
        self.last_name = last_name;
    }

    pub fn set_password(&mut self, password: String) {
        self.password = password;
    }

    /// Adds `delta` to the point tally.
    pub fn change_points(&mut self, delta: i32) {
        self.points += delta;
    }

    /// Resets the point tally to zero before a recomputation pass.
    pub fn reset_points(&mut self) {
        self.points = 0;
    }
}

/// A user account: a regular user or a moderator over one shared profile.
///
/// The variant is chosen at load time from the role tag in the file; the
/// layout of the record is identical either way. A `Nan` tag is tolerated
/// in files and carried on a regular account so it writes back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Account {
    /// Regular user with an optional stored role tag (`User` or `Nan`).
    Regular { profile: Profile, tag: Role },
    /// Moderator.
    Moderator(Profile),
}

impl Account {
    /// Creates a regular user account.
    pub fn regular(
        first_name: String,
        last_name: String,
        nickname: String,
        password: String,
        id: u32,
    ) -> Self {
        Self::Regular {
            profile: Profile::new(first_name, last_name, nickname, password, id),
            tag: Role::User,
        }
    }

    /// Creates a moderator account.
    pub fn moderator(
        first_name: String,
        last_name: String,
        nickname: String,
        password: String,
        id: u32,
    ) -> Self {
        Self::Moderator(Profile::new(first_name, last_name, nickname, password, id))
    }

    /// Rebuilds an account from a loaded profile and role tag.
    pub fn from_loaded(profile: Profile, role: Role) -> Self {
        match role {
            Role::Mod => Self::Moderator(profile),
            tag => Self::Regular { profile, tag },
        }
    }

    /// The role this account answers permission checks with.
    pub fn role(&self) -> Role {
        match self {
            Self::Regular { tag, .. } => *tag,
            Self::Moderator(_) => Role::Mod,
        }
    }

    /// Re-tags the account with a new role, keeping the profile.
    pub fn set_role(&mut self, role: Role) {
        if self.role() == role {
            return;
        }
        let profile = self.profile().clone();
        *self = Self::from_loaded(profile, role);
    }

    /// Borrows the shared profile.
    pub fn profile(&self) -> &Profile {
        match self {
            Self::Regular { profile, .. } => profile,
            Self::Moderator(profile) => profile,
        }
    }

    /// Borrows the shared profile mutably.
    pub fn profile_mut(&mut self) -> &mut Profile {
        match self {
            Self::Regular { profile, .. } => profile,
            Self::Moderator(profile) => profile,
        }
    }

    /// The account id.
    pub fn id(&self) -> u32 {
        self.profile().id()
    }

    /// The account nickname.
    pub fn nickname(&self) -> &str {
        self.profile().nickname()
    }
}
