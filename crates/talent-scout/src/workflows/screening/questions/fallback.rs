use std::collections::HashMap;

use async_trait::async_trait;

use super::{QuestionRequest, QuestionSource, SourceUnavailable};

const TECHNOLOGY_PLACEHOLDER: &str = "{technology}";

const STANDARD_TABLE: &[(&str, &[&str])] = &[
    (
        "python",
        &[
            "What are the key differences between lists and tuples in Python?",
            "How do you handle exceptions in Python and why is it important?",
            "Explain the concept of decorators in Python with an example.",
            "What is the difference between '==' and 'is' operators in Python?",
        ],
    ),
    (
        "javascript",
        &[
            "What is the difference between 'let', 'const', and 'var' in JavaScript?",
            "How do you handle asynchronous operations in JavaScript?",
            "Explain event bubbling and event capturing in JavaScript.",
            "What are closures in JavaScript and how are they useful?",
        ],
    ),
    (
        "typescript",
        &[
            "What is the difference between an interface and a type alias in TypeScript?",
            "How do generics improve type safety in TypeScript?",
            "What does strict mode change in the TypeScript compiler?",
            "How would you type a function that accepts several different shapes of input?",
        ],
    ),
    (
        "react",
        &[
            "What is the difference between state and props in React?",
            "How do you optimize React component performance?",
            "Explain the React component lifecycle methods.",
            "What are React Hooks and why were they introduced?",
        ],
    ),
    (
        "node.js",
        &[
            "What is the event loop in Node.js and how does it work?",
            "How do you handle file operations in Node.js?",
            "What are the differences between Node.js and browser JavaScript?",
            "How do you manage dependencies in a Node.js project?",
        ],
    ),
    (
        "sql",
        &[
            "What is the difference between INNER JOIN and LEFT JOIN?",
            "How do you optimize a slow-performing SQL query?",
            "Explain the concept of database normalization.",
            "What are indexes and how do they improve query performance?",
        ],
    ),
    (
        "java",
        &[
            "What is the difference between abstract classes and interfaces in Java?",
            "How does garbage collection work in Java?",
            "Explain the concept of polymorphism in Java.",
            "What are the main principles of Object-Oriented Programming?",
        ],
    ),
    (
        "rust",
        &[
            "How does Rust's ownership model prevent data races at compile time?",
            "When would you reach for Rc<RefCell<T>> instead of plain references?",
            "What is the difference between a trait object and a generic type parameter?",
            "How do you propagate and enrich errors across module boundaries in Rust?",
        ],
    ),
    (
        "go",
        &[
            "How do goroutines differ from operating system threads?",
            "When would you use a buffered channel instead of an unbuffered one?",
            "How does Go's interface satisfaction work without explicit declarations?",
            "How do you propagate cancellation with context.Context?",
        ],
    ),
    (
        "aws",
        &[
            "What are the main differences between EC2, ECS, and Lambda?",
            "How do you secure data in AWS S3 buckets?",
            "Explain the concept of Auto Scaling in AWS.",
            "What is the difference between RDS and DynamoDB?",
        ],
    ),
    (
        "docker",
        &[
            "What is the difference between a Docker image and a container?",
            "How do you optimize Docker image size?",
            "Explain the purpose of a Dockerfile.",
            "What are the benefits of using Docker in development?",
        ],
    ),
    (
        "kubernetes",
        &[
            "What is the difference between a Deployment and a StatefulSet?",
            "How do liveness and readiness checks affect traffic routing?",
            "How would you debug a pod stuck in CrashLoopBackOff?",
            "What problems do Services and Ingress resources solve?",
        ],
    ),
];

const GENERIC_QUESTIONS: &[&str] = &[
    "Can you explain your experience with {technology}?",
    "What projects have you worked on using {technology}?",
    "Describe a challenging technical problem you've solved recently with {technology}.",
    "How do you stay updated with new developments around {technology}?",
];

/// Hand-authored question lists keyed by lower-cased technology name.
#[derive(Debug, Clone)]
pub struct StaticQuestionTable {
    entries: HashMap<String, Vec<String>>,
    generic: Vec<String>,
}

impl StaticQuestionTable {
    /// `generic` entries may contain `{technology}`, replaced with the requested name.
    pub fn new<I>(entries: I, generic: Vec<String>) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let entries = entries
            .into_iter()
            .map(|(technology, questions)| (normalize(&technology), questions))
            .filter(|(_, questions)| !questions.is_empty())
            .collect();

        Self { entries, generic }
    }

    pub fn standard() -> Self {
        Self::new(
            STANDARD_TABLE.iter().map(|(technology, questions)| {
                (
                    (*technology).to_string(),
                    questions.iter().map(|question| (*question).to_string()).collect(),
                )
            }),
            GENERIC_QUESTIONS
                .iter()
                .map(|question| (*question).to_string())
                .collect(),
        )
    }

    pub fn knows(&self, technology: &str) -> bool {
        self.entries.contains_key(&normalize(technology))
    }

    /// Table entry for `technology`, or the generic list templated with its name.
    pub fn lookup(&self, technology: &str) -> Vec<String> {
        match self.entries.get(&normalize(technology)) {
            Some(questions) => questions.clone(),
            None => self
                .generic
                .iter()
                .map(|template| template.replace(TECHNOLOGY_PLACEHOLDER, technology.trim()))
                .collect(),
        }
    }
}

fn normalize(technology: &str) -> String {
    technology.trim().to_lowercase()
}

#[async_trait]
impl QuestionSource for StaticQuestionTable {
    fn name(&self) -> &'static str {
        "static_table"
    }

    async fn questions(
        &self,
        request: &QuestionRequest,
    ) -> Result<Vec<String>, SourceUnavailable> {
        let mut questions = self.lookup(&request.technology);
        if questions.is_empty() {
            return Err(SourceUnavailable::NotConfigured(request.technology.clone()));
        }
        questions.truncate(request.count.max(1));
        Ok(questions)
    }
}
