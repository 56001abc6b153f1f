//! Custom template syntax built from the `lexer:` configuration section.
//!
//! ```yaml
//! lexer:
//!   tag_block: ["{", "}"]
//!   tag_variable: ["{$", "}"]
//!   tag_comment: ["{*", "*}"]
//! ```

use crate::error::{JinjaError, JinjaResult};
use minijinja::syntax::SyntaxConfig;
use std::collections::BTreeMap;

/// Delimiter overrides; unset entries keep the engine defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexerSyntax {
    pub block: Option<(String, String)>,
    pub variable: Option<(String, String)>,
    pub comment: Option<(String, String)>,
    pub line_statement_prefix: Option<String>,
    pub line_comment_prefix: Option<String>,
}

impl LexerSyntax {
    /// Parse raw `lexer:` tokens
    pub fn from_tokens(tokens: &BTreeMap<String, serde_yaml::Value>) -> JinjaResult<Self> {
        let mut syntax = LexerSyntax::default();
        for (key, value) in tokens {
            match key.as_str() {
                "tag_block" => syntax.block = Some(delimiter_pair(key, value)?),
                "tag_variable" => syntax.variable = Some(delimiter_pair(key, value)?),
                "tag_comment" => syntax.comment = Some(delimiter_pair(key, value)?),
                "line_statement_prefix" => {
                    syntax.line_statement_prefix = Some(prefix(key, value)?)
                }
                "line_comment_prefix" => syntax.line_comment_prefix = Some(prefix(key, value)?),
                other => {
                    return Err(JinjaError::InvalidLexer {
                        message: format!(
                            "unknown token '{other}'. Valid tokens: tag_block, tag_variable, \
                             tag_comment, line_statement_prefix, line_comment_prefix"
                        ),
                    })
                }
            }
        }
        Ok(syntax)
    }

    pub fn is_empty(&self) -> bool {
        *self == LexerSyntax::default()
    }

    /// Build the engine syntax configuration
    pub fn to_syntax_config(&self) -> JinjaResult<SyntaxConfig> {
        let (block_start, block_end) = self.block.clone().unwrap_or(("{%".into(), "%}".into()));
        let (var_start, var_end) = self.variable.clone().unwrap_or(("{{".into(), "}}".into()));
        let (comment_start, comment_end) =
            self.comment.clone().unwrap_or(("{#".into(), "#}".into()));

        let mut builder = SyntaxConfig::builder();
        builder
            .block_delimiters(block_start, block_end)
            .variable_delimiters(var_start, var_end)
            .comment_delimiters(comment_start, comment_end);
        if let Some(prefix) = &self.line_statement_prefix {
            builder.line_statement_prefix(prefix.clone());
        }
        if let Some(prefix) = &self.line_comment_prefix {
            builder.line_comment_prefix(prefix.clone());
        }
        builder.build().map_err(|e| JinjaError::InvalidLexer {
            message: e.to_string(),
        })
    }
}

fn delimiter_pair(key: &str, value: &serde_yaml::Value) -> JinjaResult<(String, String)> {
    let invalid = || JinjaError::InvalidLexer {
        message: format!("'{key}' must be a list of two non-empty strings"),
    };
    let items = value.as_sequence().ok_or_else(invalid)?;
    match items.as_slice() {
        [start, end] => {
            let start = start.as_str().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
            let end = end.as_str().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
            Ok((start.to_string(), end.to_string()))
        }
        _ => Err(invalid()),
    }
}

fn prefix(key: &str, value: &serde_yaml::Value) -> JinjaResult<String> {
    value
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| JinjaError::InvalidLexer {
            message: format!("'{key}' must be a non-empty string"),
        })
}
