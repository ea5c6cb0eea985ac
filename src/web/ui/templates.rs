use askama::Template;
use askama_web::WebTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub poll_seconds: u64,
    pub default_minutes: i64,
    pub default_step_seconds: i64,
}
