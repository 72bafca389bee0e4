pub type GraphgenResult<T> = Result<T, GraphgenError>;

#[derive(thiserror::Error, Debug)]
pub enum GraphgenError {
    #[error("graph type '{0}' is not defined in the repository manifest")]
    UnknownGraphType(String),

    #[error("algorithm '{0}' is not defined in the repository manifest")]
    UnknownAlgorithm(String),

    #[error("malformed binding: {0}")]
    MalformedBinding(String),

    #[error("no template defined for algorithm '{0}'")]
    NoTemplateDefined(String),

    #[error("template '{0}' not found")]
    TemplateNotFound(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("compiler error: {0}")]
    Compiler(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GraphgenError {
    pub fn unknown_graph_type(name: impl Into<String>) -> Self {
        Self::UnknownGraphType(name.into())
    }

    pub fn unknown_algorithm(name: impl Into<String>) -> Self {
        Self::UnknownAlgorithm(name.into())
    }

    pub fn malformed_binding(msg: impl Into<String>) -> Self {
        Self::MalformedBinding(msg.into())
    }

    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    pub fn compiler(msg: impl Into<String>) -> Self {
        Self::Compiler(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        assert!(
            GraphgenError::unknown_graph_type("x")
                .to_string()
                .contains("graph type 'x'")
        );
        assert!(
            GraphgenError::unknown_algorithm("x")
                .to_string()
                .contains("algorithm 'x'")
        );
        assert!(
            GraphgenError::malformed_binding("x")
                .to_string()
                .contains("malformed binding:")
        );
        assert!(
            GraphgenError::NoTemplateDefined("x".into())
                .to_string()
                .contains("no template defined")
        );
        assert!(
            GraphgenError::TemplateNotFound("x".into())
                .to_string()
                .contains("not found")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = GraphgenError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
