use typed_builder::TypedBuilder;

/// Key and routing clauses that precede the `|>` chain of AI.DAGEXECUTE
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct DagExecuteParams {
    #[builder(default = Vec::new(), setter(transform = |names: &[&str]| names.iter().map(|n| n.to_string()).collect()))]
    pub load: Vec<String>,

    #[builder(default = Vec::new(), setter(transform = |names: &[&str]| names.iter().map(|n| n.to_string()).collect()))]
    pub persist: Vec<String>,

    #[builder(default = None, setter(strip_option, into))]
    pub routing: Option<String>,

    /// milliseconds, forwarded to the server as is
    #[builder(default = None, setter(strip_option))]
    pub timeout: Option<u64>,
}
