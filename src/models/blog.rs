use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBlogRequest {
    #[serde(default)]
    pub word_count: Option<u32>,
    #[serde(default)]
    pub subheadings_count: Option<u32>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
}

/// Validated blog parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogParams {
    pub word_count: u32,
    pub subheadings_count: u32,
    pub keywords: Vec<String>,
}

impl GenerateBlogRequest {
    pub fn validate(&self) -> Result<BlogParams> {
        let word_count = self
            .word_count
            .filter(|count| *count > 0)
            .ok_or_else(|| GenError::InvalidInput("wordCount must be a positive number".into()))?;
        let subheadings_count = self.subheadings_count.filter(|count| *count > 0).ok_or_else(
            || GenError::InvalidInput("subheadingsCount must be a positive number".into()),
        )?;

        let keywords: Vec<String> = self
            .keywords
            .iter()
            .flatten()
            .map(|keyword| keyword.trim())
            .filter(|keyword| !keyword.is_empty())
            .map(String::from)
            .collect();
        if keywords.is_empty() {
            return Err(GenError::InvalidInput(
                "keywords must contain at least one entry".into(),
            ));
        }

        Ok(BlogParams {
            word_count,
            subheadings_count,
            keywords,
        })
    }
}

impl BlogParams {
    pub fn structure_prompt(&self) -> String {
        format!(
            "Create a blog article structure with exactly {} subheadings about {}. Format as JSON with title and subheadings array.",
            self.subheadings_count,
            self.keywords.join(", ")
        )
    }

    pub fn article_prompt(&self, structure: &ArticleStructure) -> String {
        format!(
            "Write a blog article about {} with approximately {} words. Use these subheadings: {}. Make it engaging and informative.",
            self.keywords.join(", "),
            self.word_count,
            structure.subheadings.join(", ")
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleStructure {
    pub title: String,
    #[serde(default)]
    pub subheadings: Vec<String>,
}

impl ArticleStructure {
    /// Parses the structure out of a model reply. Code fences and prose around
    /// the outermost JSON object are ignored.
    pub fn parse(reply: &str) -> Result<Self> {
        let start = reply.find('{');
        let end = reply.rfind('}');
        let json = match (start, end) {
            (Some(start), Some(end)) if start < end => &reply[start..=end],
            _ => {
                return Err(GenError::MalformedStructure(
                    "reply does not contain a JSON object".into(),
                ))
            }
        };

        serde_json::from_str(json).map_err(|e| GenError::MalformedStructure(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogArticle {
    pub title: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> GenerateBlogRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_validate_trims_keywords() {
        let params = request(
            r#"{"wordCount": 500, "subheadingsCount": 3, "keywords": [" rust ", "", "async"]}"#,
        )
        .validate()
        .unwrap();
        assert_eq!(params.keywords, vec!["rust", "async"]);
        assert_eq!(params.word_count, 500);
        assert_eq!(
            params.structure_prompt(),
            "Create a blog article structure with exactly 3 subheadings about rust, async. Format as JSON with title and subheadings array."
        );
    }

    #[test]
    fn test_validate_rejects_missing_parameters() {
        for body in [
            r#"{}"#,
            r#"{"wordCount": 0, "subheadingsCount": 3, "keywords": ["rust"]}"#,
            r#"{"wordCount": 500, "keywords": ["rust"]}"#,
            r#"{"wordCount": 500, "subheadingsCount": 3, "keywords": ["  "]}"#,
        ] {
            let err = request(body).validate().unwrap_err();
            assert_eq!(err.status_code(), 400, "body {}", body);
        }
    }

    #[test]
    fn test_parse_fenced_structure() {
        let reply = "Here you go:\n```json\n{\"title\": \"Ferris\", \"subheadings\": [\"Ownership\", \"Borrowing\"]}\n```";
        let structure = ArticleStructure::parse(reply).unwrap();
        assert_eq!(structure.title, "Ferris");
        assert_eq!(structure.subheadings, vec!["Ownership", "Borrowing"]);
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(matches!(
            ArticleStructure::parse("No response received."),
            Err(GenError::MalformedStructure(_))
        ));
        assert!(ArticleStructure::parse("{\"subheadings\": []}").is_err());
    }

    #[test]
    fn test_article_prompt() {
        let params = BlogParams {
            word_count: 800,
            subheadings_count: 2,
            keywords: vec!["tea".into(), "ceremony".into()],
        };
        let structure = ArticleStructure {
            title: "Tea".into(),
            subheadings: vec!["History".into(), "Practice".into()],
        };
        assert_eq!(
            params.article_prompt(&structure),
            "Write a blog article about tea, ceremony with approximately 800 words. Use these subheadings: History, Practice. Make it engaging and informative."
        );
    }
}
