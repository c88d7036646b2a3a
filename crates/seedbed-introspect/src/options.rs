/// Options that control schema discovery.
#[derive(Debug, Clone)]
pub struct IntrospectOptions {
    /// Namespace (PostgreSQL schema) whose tables are discovered.
    pub namespace: String,
    /// Include partitioned parent tables alongside ordinary tables.
    pub include_partitioned: bool,
}

impl Default for IntrospectOptions {
    fn default() -> Self {
        Self {
            namespace: "public".to_string(),
            include_partitioned: true,
        }
    }
}

impl IntrospectOptions {
    pub fn for_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }
}
