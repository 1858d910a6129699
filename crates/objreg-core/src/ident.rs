//! Identifier capability and default scope naming.
//!
//! Identifier lookup is an explicit capability, not a runtime probe: types
//! that can name their own identifier implement [`Identified`], everything
//! else goes through the `*_with_id` registry methods.

/// Capability trait for objects that carry their own registry identifier.
///
/// The identifier must be deterministic for a given instance; the registry
/// keys the instance by it for the instance's whole registered lifetime.
///
/// # Example
///
/// ```
/// use objreg_core::Identified;
///
/// struct User {
///     id: u64,
/// }
///
/// impl Identified for User {
///     fn object_id(&self) -> String {
///         self.id.to_string()
///     }
/// }
/// ```
pub trait Identified {
    /// The object's identifier within its scope, in normalized string form.
    fn object_id(&self) -> String;
}

/// Default scope id for values of type `T`: the short type name.
///
/// Module paths are stripped (also inside generic parameters), so
/// `my_app::model::User` scopes as `"User"` and
/// `Wrapper<my_app::model::User>` as `"Wrapper<User>"`, keeping scope ids
/// and dumps readable.
pub fn scope_name<T: ?Sized>() -> String {
    short_type_name(std::any::type_name::<T>())
}

/// Strip `path::to::` prefixes from a `std::any::type_name` string.
pub(crate) fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;

    for (i, ch) in full.char_indices() {
        match ch {
            // "::" clears the pending segment twice; the net effect is that
            // only the last path segment before a delimiter survives.
            ':' => segment_start = i + 1,
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';' => {
                out.push_str(&full[segment_start..i]);
                out.push(ch);
                segment_start = i + 1;
            }
            _ => {}
        }
    }
    out.push_str(&full[segment_start..]);
    out
}
