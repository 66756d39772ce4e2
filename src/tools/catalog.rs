use serde_json::{Value, json};

pub const LANGUAGES: [&str; 7] = ["nodejs", "python", "go", "ruby", "java", "rust", "php"];

pub const PLATFORMS: [&str; 5] = [
    "github-actions",
    "gitlab-ci",
    "circleci",
    "jenkins",
    "aws-codepipeline",
];

pub fn list_languages() -> Value {
    json!({ "languages": LANGUAGES })
}

pub fn list_platforms() -> Value {
    json!({ "platforms": PLATFORMS })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_languages_is_fixed_and_ordered() {
        assert_eq!(
            list_languages(),
            json!({"languages": ["nodejs", "python", "go", "ruby", "java", "rust", "php"]})
        );
    }

    #[test]
    fn list_platforms_is_fixed_and_ordered() {
        assert_eq!(
            list_platforms(),
            json!({"platforms": ["github-actions", "gitlab-ci", "circleci", "jenkins", "aws-codepipeline"]})
        );
    }
}
