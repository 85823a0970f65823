use serde::{Deserialize, Serialize};

/// Layout of one saved dictionary entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveTemplate {
    pub template: String,
}

impl Default for SaveTemplate {
    fn default() -> Self {
        Self {
            template: "\nWord: {word}\nEnglish Meaning: {english}\nHindi Meaning: {hindi}\n"
                .to_string(),
        }
    }
}

impl SaveTemplate {
    pub fn new(template: String) -> Self {
        Self { template }
    }

    /// Fill `{word}`, `{english}` and `{hindi}`.
    ///
    /// Substituted values are not rescanned, so text that happens to contain
    /// a placeholder is inserted verbatim.
    pub fn format(&self, word: &str, english: &str, hindi: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + english.len() + 32);
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            let value = [("{word}", word), ("{english}", english), ("{hindi}", hindi)]
                .into_iter()
                .find(|(placeholder, _)| tail.starts_with(placeholder));

            match value {
                Some((placeholder, value)) => {
                    out.push_str(value);
                    rest = &tail[placeholder.len()..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);

        out
    }
}
