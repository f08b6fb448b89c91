// keys used in the workflow context instead of bare strings
pub mod context_keys {
    pub const MESSAGE: &str = "message";
    pub const INTERACTION: &str = "interaction";
}
