use crate::error::ShellError;
use sha2::{Digest, Sha256};

const CLASS_PREFIX: &str = "__className_";
const HASH_LEN: usize = 6;
const GOOGLE_FONTS_CSS: &str = "https://fonts.googleapis.com/css2";

/// A web font bound to a generated style-class token.
///
/// The token depends only on the family and subsets, so every render of every page
/// agrees on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    family: String,
    subsets: Vec<String>,
    class_name: String,
}

impl Font {
    /// Registers a Google Fonts family.
    ///
    /// # Errors
    /// Returns [`ShellError::Font`] for a blank family name.
    pub fn google<S>(family: &str, subsets: impl IntoIterator<Item = S>) -> Result<Self, ShellError>
    where
        S: Into<String>,
    {
        let family = family.trim();
        if family.is_empty() {
            return Err(ShellError::Font {
                message: "family cannot be empty".into(),
                context: None,
            });
        }

        let subsets: Vec<String> = subsets.into_iter().map(Into::into).collect();
        let digest = Sha256::digest(format!("{family}|{}", subsets.join(",")).as_bytes());
        let class_name = format!("{CLASS_PREFIX}{}", &hex::encode(digest)[..HASH_LEN]);

        Ok(Self { family: family.to_owned(), subsets, class_name })
    }

    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    #[must_use]
    pub fn subsets(&self) -> &[String] {
        &self.subsets
    }

    /// The token placed on `<body class=...>`.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// CSS binding [`Font::class_name`] to the family.
    #[must_use]
    pub fn css(&self) -> String {
        format!(
            ".{} {{\n  font-family: '{}', system-ui, sans-serif;\n  font-style: normal;\n}}\n",
            self.class_name, self.family
        )
    }

    /// Google Fonts stylesheet URL for the family.
    #[must_use]
    pub fn stylesheet_url(&self) -> String {
        format!("{GOOGLE_FONTS_CSS}?family={}&display=swap", self.family.replace(' ', "+"))
    }
}
