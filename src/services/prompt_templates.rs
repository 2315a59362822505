use std::path::PathBuf;

use crate::constants::quiz_prompt::DEFAULT_QUIZ_PROMPT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    File(PathBuf),
    Embedded,
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub body: String,
    pub source: TemplateSource,
}

impl PromptTemplate {
    pub fn embedded() -> Self {
        Self {
            body: DEFAULT_QUIZ_PROMPT.to_string(),
            source: TemplateSource::Embedded,
        }
    }

    pub fn render(
        &self,
        content: &str,
        language: &str,
        num_questions: usize,
        num_options: usize,
    ) -> String {
        // Content goes last so placeholders inside the article are left alone.
        fill_template(
            &self.body,
            &[
                ("num_questions", &num_questions.to_string()),
                ("num_options", &num_options.to_string()),
                ("language", language),
                ("content", content),
            ],
        )
    }
}

pub fn fill_template(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in pairs {
        let needle = format!("{{{}}}", key);
        out = out.replace(&needle, value);
    }
    out
}

/// Resolves `quiz_prompt.<language>.txt` under an optional directory.
#[derive(Debug, Clone, Default)]
pub struct PromptTemplates {
    dir: Option<PathBuf>,
}

impl PromptTemplates {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn embedded_only() -> Self {
        Self { dir: None }
    }

    /// Never fails: anything unloadable resolves to the embedded template.
    pub async fn resolve(&self, language: &str) -> PromptTemplate {
        let Some(path) = self.path_for(language) else {
            return PromptTemplate::embedded();
        };

        match tokio::fs::read_to_string(&path).await {
            Ok(body) if !body.trim().is_empty() => {
                log::debug!("Using prompt template {}", path.display());
                PromptTemplate {
                    body,
                    source: TemplateSource::File(path),
                }
            }
            Ok(_) => {
                log::warn!("Prompt template {} is empty, using default", path.display());
                PromptTemplate::embedded()
            }
            Err(e) => {
                log::debug!(
                    "No prompt template at {} ({}), using default",
                    path.display(),
                    e
                );
                PromptTemplate::embedded()
            }
        }
    }

    fn path_for(&self, language: &str) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        let language = language.trim().to_ascii_lowercase();
        let is_plain_tag = !language.is_empty()
            && language.len() <= 16
            && language.chars().all(|c| c.is_ascii_alphabetic() || c == '-');
        if !is_plain_tag {
            return None;
        }
        Some(dir.join(format!("quiz_prompt.{}.txt", language)))
    }
}
