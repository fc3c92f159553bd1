pub struct ThemeRule {
    pub name: &'static str,
    pub directories: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub frameworks: &'static [&'static str],
}

pub struct ThemeCategory {
    pub name: &'static str,
    pub label: &'static str,
    pub themes: &'static [ThemeRule],
}

pub const DIRECTORY_WEIGHT: f64 = 0.4;
pub const KEYWORD_WEIGHT: f64 = 0.3;
pub const FRAMEWORK_WEIGHT: f64 = 0.3;

pub const THEME_TAXONOMY: &[ThemeCategory] = &[
    ThemeCategory {
        name: "functional_domains",
        label: "Functional domain",
        themes: &[
            ThemeRule {
                name: "authentication",
                directories: &["auth", "login", "signin", "oauth", "identity"],
                keywords: &["auth", "login", "logout", "password", "token", "jwt", "session", "credential"],
                frameworks: &["passport", "jsonwebtoken", "bcrypt", "next-auth", "django-allauth"],
            },
            ThemeRule {
                name: "user-management",
                directories: &["user", "account", "profile", "member"],
                keywords: &["user", "account", "profile", "role", "permission", "member"],
                frameworks: &[],
            },
            ThemeRule {
                name: "payment",
                directories: &["payment", "billing", "checkout", "invoice", "subscription"],
                keywords: &["payment", "billing", "invoice", "checkout", "price", "stripe", "charge"],
                frameworks: &["stripe", "paypal", "braintree"],
            },
            ThemeRule {
                name: "search",
                directories: &["search", "index", "query"],
                keywords: &["search", "query", "filter", "index", "rank"],
                frameworks: &["elasticsearch", "algolia", "meilisearch"],
            },
            ThemeRule {
                name: "notification",
                directories: &["notification", "notify", "alert", "email", "mail"],
                keywords: &["notification", "notify", "email", "mail", "sms", "push"],
                frameworks: &["nodemailer", "twilio", "sendgrid"],
            },
        ],
    },
    ThemeCategory {
        name: "technical_layers",
        label: "Technical layer",
        themes: &[
            ThemeRule {
                name: "api",
                directories: &["api", "routes", "endpoint", "controller", "handler"],
                keywords: &["api", "route", "endpoint", "request", "response", "handler", "controller"],
                frameworks: &["express", "fastapi", "flask", "django", "axum", "actix", "koa", "nestjs"],
            },
            ThemeRule {
                name: "database",
                directories: &["db", "database", "migration", "schema", "repository"],
                keywords: &["database", "query", "schema", "migration", "table", "sql", "repository"],
                frameworks: &["sqlalchemy", "prisma", "sequelize", "mongoose", "typeorm", "diesel", "sqlx"],
            },
            ThemeRule {
                name: "models",
                directories: &["model", "entity", "entities", "domain"],
                keywords: &["model", "entity", "field", "attribute", "serializer"],
                frameworks: &["pydantic", "serde"],
            },
            ThemeRule {
                name: "services",
                directories: &["service", "provider", "manager"],
                keywords: &["service", "provider", "manager", "client"],
                frameworks: &[],
            },
            ThemeRule {
                name: "middleware",
                directories: &["middleware", "interceptor", "guard"],
                keywords: &["middleware", "interceptor", "guard", "next"],
                frameworks: &[],
            },
            ThemeRule {
                name: "utilities",
                directories: &["util", "helper", "common", "shared"],
                keywords: &["util", "helper", "format", "parse", "convert"],
                frameworks: &["lodash", "underscore"],
            },
        ],
    },
    ThemeCategory {
        name: "user_interface",
        label: "User interface",
        themes: &[
            ThemeRule {
                name: "components",
                directories: &["component", "widget", "ui", "elements"],
                keywords: &["component", "props", "render", "widget", "button"],
                frameworks: &["react", "vue", "angular", "svelte"],
            },
            ThemeRule {
                name: "pages",
                directories: &["page", "view", "screen", "template"],
                keywords: &["page", "view", "screen", "template", "layout"],
                frameworks: &["next", "nuxt", "gatsby"],
            },
            ThemeRule {
                name: "styles",
                directories: &["style", "css", "theme", "scss"],
                keywords: &["style", "color", "font", "margin", "padding"],
                frameworks: &["tailwindcss", "styled-components", "sass", "bootstrap"],
            },
            ThemeRule {
                name: "forms",
                directories: &["form", "input", "validation"],
                keywords: &["form", "input", "submit", "validate", "field"],
                frameworks: &["formik", "react-hook-form", "yup", "zod"],
            },
        ],
    },
    ThemeCategory {
        name: "integrations",
        label: "Integration",
        themes: &[
            ThemeRule {
                name: "external-apis",
                directories: &["integration", "external", "third", "client", "sdk"],
                keywords: &["integration", "webhook", "external", "client", "sdk"],
                frameworks: &["axios", "requests", "reqwest", "httpx"],
            },
            ThemeRule {
                name: "cloud",
                directories: &["aws", "gcp", "azure", "cloud", "s3"],
                keywords: &["aws", "bucket", "lambda", "cloud", "storage"],
                frameworks: &["aws-sdk", "boto3", "firebase"],
            },
            ThemeRule {
                name: "messaging",
                directories: &["queue", "message", "event", "pubsub", "worker"],
                keywords: &["queue", "message", "event", "publish", "subscribe", "consumer"],
                frameworks: &["kafka", "rabbitmq", "redis", "celery", "bull"],
            },
        ],
    },
    ThemeCategory {
        name: "data_management",
        label: "Data management",
        themes: &[
            ThemeRule {
                name: "data-processing",
                directories: &["etl", "pipeline", "processing", "transform", "jobs"],
                keywords: &["pipeline", "transform", "process", "batch", "dataset"],
                frameworks: &["pandas", "numpy", "spark"],
            },
            ThemeRule {
                name: "caching",
                directories: &["cache"],
                keywords: &["cache", "ttl", "invalidate", "memoize"],
                frameworks: &["redis", "memcached"],
            },
            ThemeRule {
                name: "storage",
                directories: &["storage", "upload", "files", "media"],
                keywords: &["upload", "download", "file", "blob", "storage"],
                frameworks: &["multer"],
            },
        ],
    },
    ThemeCategory {
        name: "operational",
        label: "Operational",
        themes: &[
            ThemeRule {
                name: "testing",
                directories: &["test", "spec", "e2e", "fixture", "mock"],
                keywords: &["test", "assert", "expect", "mock", "fixture", "describe"],
                frameworks: &["jest", "pytest", "mocha", "cypress", "vitest", "playwright"],
            },
            ThemeRule {
                name: "deployment",
                directories: &["deploy", "docker", "k8s", "kubernetes", "infra", "ci"],
                keywords: &["deploy", "docker", "container", "image", "helm", "pipeline"],
                frameworks: &["docker", "kubernetes", "terraform"],
            },
            ThemeRule {
                name: "configuration",
                directories: &["config", "settings", "env"],
                keywords: &["config", "setting", "environment", "option"],
                frameworks: &["dotenv"],
            },
            ThemeRule {
                name: "monitoring",
                directories: &["monitor", "metrics", "logging", "telemetry"],
                keywords: &["log", "metric", "trace", "monitor", "telemetry"],
                frameworks: &["winston", "sentry", "prometheus", "opentelemetry"],
            },
            ThemeRule {
                name: "documentation",
                directories: &["docs", "doc", "guide", "wiki"],
                keywords: &["documentation", "guide", "readme", "tutorial"],
                frameworks: &["sphinx", "docusaurus", "mkdocs"],
            },
        ],
    },
];

pub fn category_label(category: &str) -> &'static str {
    THEME_TAXONOMY
        .iter()
        .find(|c| c.name == category)
        .map(|c| c.label)
        .unwrap_or("Project")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_theme_names_are_unique() {
        let mut seen = HashSet::new();
        for category in THEME_TAXONOMY {
            for rule in category.themes {
                assert!(seen.insert(rule.name), "duplicate theme {}", rule.name);
            }
        }
    }

    #[test]
    fn test_rules_are_lowercase_and_non_empty() {
        for category in THEME_TAXONOMY {
            for rule in category.themes {
                assert!(!rule.directories.is_empty());
                assert!(!rule.keywords.is_empty());
                for token in rule.directories.iter().chain(rule.keywords).chain(rule.frameworks) {
                    assert_eq!(*token, token.to_lowercase());
                }
            }
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!((DIRECTORY_WEIGHT + KEYWORD_WEIGHT + FRAMEWORK_WEIGHT - 1.0).abs() < f64::EPSILON);
    }
}
