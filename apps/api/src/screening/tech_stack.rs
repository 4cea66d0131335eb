//! Tech Stack Extractor — maps free text to recognised technology labels.
//!
//! Matching is case-insensitive and keyword-bounded: a keyword only counts when
//! it is not glued to surrounding letters, so "java" does not fire inside
//! "javascript" and "go" does not fire inside "django". Digits are allowed as
//! neighbours ("python3", "java8").
//!
//! Labels that are also everyday English words ("go", "spring", "express") are
//! only picked up from their capitalised form or an unambiguous spelling such as
//! "golang" or "spring boot".

use crate::models::session::TechStack;

/// One dictionary entry: a display label and the keywords that select it.
#[derive(Debug, Clone, Copy)]
pub struct TechEntry {
    pub label: &'static str,
    /// Lower-case keywords, matched case-insensitively.
    pub keywords: &'static [&'static str],
    /// Keywords matched exactly as written.
    pub cased: &'static [&'static str],
}

impl TechEntry {
    pub const fn with_cased(self, cased: &'static [&'static str]) -> Self {
        TechEntry { cased, ..self }
    }
}

pub const fn tech(label: &'static str, keywords: &'static [&'static str]) -> TechEntry {
    TechEntry {
        label,
        keywords,
        cased: &[],
    }
}

/// Static dictionary, grouped by category. Iteration order defines stack order.
pub const TECH_DICTIONARY: &[TechEntry] = &[
    // Languages
    tech("Python", &["python", "py"]),
    tech("Java", &["java"]),
    tech("JavaScript", &["javascript", "ecmascript"]),
    tech("TypeScript", &["typescript"]),
    tech("C++", &["c++", "cpp"]),
    tech("C#", &["c#", "csharp", ".net", "asp.net", "dotnet"]),
    tech("Go", &["golang", "go lang"]).with_cased(&["Go", "GO"]),
    tech("Rust", &["rust"]),
    tech("PHP", &["php"]),
    tech("Ruby", &["ruby"]),
    tech("Swift", &["swift"]),
    tech("Kotlin", &["kotlin"]),
    // Frameworks
    tech("React", &["react", "reactjs", "react.js"]),
    tech("Angular", &["angular", "angularjs"]),
    tech("Vue", &["vue", "vuejs", "vue.js"]),
    tech("Node.js", &["node", "nodejs", "node.js"]),
    tech("Express", &["expressjs", "express.js"]).with_cased(&["Express"]),
    tech("Django", &["django"]),
    tech("Flask", &["flask"]),
    tech("Spring", &["spring boot", "springboot", "spring framework"])
        .with_cased(&["Spring"]),
    tech("Laravel", &["laravel"]),
    tech("Rails", &["rails", "ruby on rails"]),
    tech("FastAPI", &["fastapi"]),
    // Databases
    tech("MySQL", &["mysql"]),
    tech("PostgreSQL", &["postgresql", "postgres", "psql"]),
    tech("MongoDB", &["mongodb", "mongo"]),
    tech("Redis", &["redis"]),
    tech("SQLite", &["sqlite"]),
    tech("Oracle", &["oracle"]),
    tech("Cassandra", &["cassandra"]),
    tech("Elasticsearch", &["elasticsearch", "elastic search"]),
    // Cloud and tooling
    tech("AWS", &["aws", "amazon web services"]),
    tech("Azure", &["azure"]),
    tech("GCP", &["gcp", "google cloud"]),
    tech("Docker", &["docker"]),
    tech("Kubernetes", &["kubernetes", "k8s"]),
    tech("Jenkins", &["jenkins"]),
    tech("Git", &["git", "github", "gitlab"]),
    tech("Linux", &["linux"]),
    // Web
    tech("HTML", &["html", "html5"]),
    tech("CSS", &["css", "css3"]),
    tech("Bootstrap", &["bootstrap"]),
    tech("Tailwind", &["tailwind", "tailwindcss"]),
    tech("Sass", &["sass", "scss"]),
    tech("jQuery", &["jquery"]),
    tech("Webpack", &["webpack"]),
    // Machine learning
    tech("TensorFlow", &["tensorflow"]),
    tech("PyTorch", &["pytorch"]),
    tech("scikit-learn", &["scikit-learn", "sklearn", "scikit"]),
    tech("Pandas", &["pandas"]),
    tech("NumPy", &["numpy"]),
    tech("Keras", &["keras"]),
    tech("OpenCV", &["opencv"]),
];

/// Labels offered to the candidate when nothing was recognised.
pub const CLARIFICATION_EXAMPLES: &[&str] = &[
    "Python", "Java", "JavaScript", "React", "Django", "PostgreSQL", "Docker", "AWS",
];

/// Extracts the technologies mentioned in `text` using the built-in dictionary.
pub fn extract_tech_stack(text: &str) -> TechStack {
    extract_with(TECH_DICTIONARY, text)
}

/// Extracts against an explicit dictionary. No state is kept between calls.
pub fn extract_with(dictionary: &[TechEntry], text: &str) -> TechStack {
    let haystack = text.to_lowercase();
    TechStack::from_labels(
        dictionary
            .iter()
            .filter(|entry| {
                entry.keywords.iter().any(|kw| contains_keyword(&haystack, kw))
                    || entry.cased.iter().any(|kw| contains_keyword(text, kw))
            })
            .map(|entry| entry.label),
    )
}

/// True when `keyword` occurs in `haystack` without a letter directly on either side.
fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    haystack.match_indices(keyword).any(|(start, matched)| {
        let end = start + matched.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphabetic());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphabetic());
        before_ok && after_ok
    })
}
