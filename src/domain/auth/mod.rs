mod extractors;
mod login;
mod register;
mod update_user;
mod users;

pub use extractors::{AdminUser, AuthUser};
pub use login::{Login, LoginPayload, SignedInUser, login, login_endpoint};
pub use register::{
    RegisterPayload, RegisteredIdentity, Registration, register, register_endpoint,
};
pub use update_user::{UpdatedUser, update_user, update_user_endpoint};
pub use users::{
    NewUser, Role, User, UserAddress, UserPatch, find_by_email, find_by_user_id, grant_admin,
};
