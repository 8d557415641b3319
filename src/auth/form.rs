use crate::auth::dto::UserForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Register,
    Login,
}

/// Returns the first blank field as `"<field> empty/not found"`.
///
/// Only presence is checked; email syntax and password strength are left
/// to the caller's own policy.
pub fn validate(form: &UserForm, kind: FormKind) -> Result<(), String> {
    let mut fields = vec![("email", &form.email), ("password", &form.password)];
    if kind == FormKind::Register {
        fields.extend([
            ("full_name", &form.full_name),
            ("address", &form.address),
            ("phone_number", &form.phone_number),
            ("role", &form.role),
        ]);
    }

    match fields.into_iter().find(|(_, value)| is_blank(value)) {
        Some((name, _)) => Err(format!("{name} empty/not found")),
        None => Ok(()),
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
