use middleware::{extractor::ExtractionMiddleware, guard::AuthGuard};

pub mod middleware {
    pub mod extractor;
    pub mod guard;
}

pub fn middleware() -> ExtractionMiddleware {
    ExtractionMiddleware::new()
}

pub fn auth_middleware() -> AuthGuard {
    AuthGuard::new()
}
