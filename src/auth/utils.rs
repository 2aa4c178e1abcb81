use crate::{
    auth::claims::Caller,
    errors::{AppError, AppResult},
};

pub fn require_staff(caller: &Caller) -> AppResult<()> {
    if !caller.is_staff() {
        return Err(AppError::Forbidden(
            "Only faculty or admins can perform this action".to_string(),
        ));
    }
    Ok(())
}

pub fn require_self_or_staff(caller: &Caller, user_id: &str) -> AppResult<()> {
    if !caller.is_staff() && caller.user_id != user_id {
        return Err(AppError::Forbidden(
            "You can only access your own attempts".to_string(),
        ));
    }
    Ok(())
}
