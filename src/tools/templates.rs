struct Toolchain {
    setup_action: &'static str,
    setup_with: &'static [(&'static str, &'static str)],
    image: &'static str,
    install: &'static str,
    test: &'static str,
    build: &'static str,
}

fn toolchain(language: &str) -> Option<Toolchain> {
    let toolchain = match language {
        "nodejs" => Toolchain {
            setup_action: "actions/setup-node@v4",
            setup_with: &[("node-version", "'20'"), ("cache", "npm")],
            image: "node:20",
            install: "npm ci",
            test: "npm test",
            build: "npm run build --if-present",
        },
        "python" => Toolchain {
            setup_action: "actions/setup-python@v5",
            setup_with: &[("python-version", "'3.12'"), ("cache", "pip")],
            image: "python:3.12",
            install: "pip install -r requirements.txt",
            test: "pytest",
            build: "python -m compileall .",
        },
        "go" => Toolchain {
            setup_action: "actions/setup-go@v5",
            setup_with: &[("go-version", "'1.22'")],
            image: "golang:1.22",
            install: "go mod download",
            test: "go test ./...",
            build: "go build ./...",
        },
        "ruby" => Toolchain {
            setup_action: "ruby/setup-ruby@v1",
            setup_with: &[("ruby-version", "'3.3'"), ("bundler-cache", "true")],
            image: "ruby:3.3",
            install: "bundle install",
            test: "bundle exec rake test",
            build: "bundle exec rake build",
        },
        "java" => Toolchain {
            setup_action: "actions/setup-java@v4",
            setup_with: &[
                ("distribution", "temurin"),
                ("java-version", "'21'"),
                ("cache", "maven"),
            ],
            image: "maven:3-eclipse-temurin-21",
            install: "mvn -B dependency:go-offline",
            test: "mvn -B test",
            build: "mvn -B package -DskipTests",
        },
        "rust" => Toolchain {
            setup_action: "dtolnay/rust-toolchain@stable",
            setup_with: &[],
            image: "rust:1",
            install: "cargo fetch",
            test: "cargo test",
            build: "cargo build --release",
        },
        "php" => Toolchain {
            setup_action: "shivammathur/setup-php@v2",
            setup_with: &[("php-version", "'8.3'")],
            image: "composer:2",
            install: "composer install --no-interaction",
            test: "vendor/bin/phpunit",
            build: "composer dump-autoload --optimize",
        },
        _ => return None,
    };
    Some(toolchain)
}

/// Synthesizes a minimal pipeline for `platform`. Never fails and never
/// returns empty text.
pub fn fallback_pipeline(language: &str, platform: &str) -> String {
    match platform {
        "github-actions" => github_actions_template(language),
        "gitlab-ci" => gitlab_ci_template(language),
        _ => generic_template(language),
    }
}

fn github_actions_template(language: &str) -> String {
    let mut lines = vec![
        "name: CI/CD Pipeline".to_owned(),
        String::new(),
        "on:".to_owned(),
        "  push:".to_owned(),
        "    branches: [ main, develop ]".to_owned(),
        "  pull_request:".to_owned(),
        "    branches: [ main ]".to_owned(),
        String::new(),
        "jobs:".to_owned(),
        "  build:".to_owned(),
        "    runs-on: ubuntu-latest".to_owned(),
        "    steps:".to_owned(),
        "    - uses: actions/checkout@v4".to_owned(),
    ];

    match toolchain(language) {
        Some(tc) => {
            lines.push(format!("    - name: Setup {language}"));
            lines.push(format!("      uses: {}", tc.setup_action));
            if !tc.setup_with.is_empty() {
                lines.push("      with:".to_owned());
                for (key, value) in tc.setup_with {
                    lines.push(format!("        {key}: {value}"));
                }
            }
            push_run_step(&mut lines, "Install dependencies", tc.install);
            push_run_step(&mut lines, "Test", tc.test);
            push_run_step(&mut lines, "Build", tc.build);
        }
        None => {
            push_run_step(&mut lines, "Install dependencies", "echo \"Install\"");
            push_run_step(&mut lines, "Test", "echo \"Test\"");
            push_run_step(
                &mut lines,
                "Build",
                &format!("echo \"Building {language}...\""),
            );
        }
    }

    lines.join("\n") + "\n"
}

fn push_run_step(lines: &mut Vec<String>, name: &str, command: &str) {
    lines.push(format!("    - name: {name}"));
    lines.push(format!("      run: {command}"));
}

fn gitlab_ci_template(language: &str) -> String {
    let (image, install, test, build) = match toolchain(language) {
        Some(tc) => (
            tc.image.to_owned(),
            tc.install.to_owned(),
            tc.test.to_owned(),
            tc.build.to_owned(),
        ),
        None => (
            "alpine:latest".to_owned(),
            "echo \"Install\"".to_owned(),
            "echo \"Test\"".to_owned(),
            format!("echo \"Building {language}...\""),
        ),
    };

    format!(
        "stages:
  - build
  - test

default:
  image: {image}

build:
  stage: build
  script:
    - {install}
    - {build}

test:
  stage: test
  script:
    - {test}
"
    )
}

fn generic_template(language: &str) -> String {
    format!(
        "stages:
  - build
  - test

build:
  stage: build
  script:
    - echo \"Building {language}...\"

test:
  stage: test
  script:
    - echo \"Testing {language}...\"
"
    )
}
