pub(crate) mod add;
pub(crate) mod complete;
pub(crate) mod delete;
pub(crate) mod list;
