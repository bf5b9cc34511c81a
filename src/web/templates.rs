use minijinja::{context, Environment};
use tracing::error;

use crate::widget::WidgetView;

pub const WIDGET_TEMPLATE: &str = "widget.html";

pub fn init_templates() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(WIDGET_TEMPLATE, include_str!("../../templates/widget.html"))?;
    Ok(env)
}

/// Renders the widget page. A template failure becomes an error page, never a 500.
pub fn render_widget(env: &Environment, view: &WidgetView, endpoint: &str) -> String {
    let rendered = env
        .get_template(WIDGET_TEMPLATE)
        .and_then(|tmpl| tmpl.render(context! { view, endpoint }));

    rendered.unwrap_or_else(|e| {
        error!("Failed to render {}: {}", WIDGET_TEMPLATE, e);
        format!("<h1>Template Error</h1><p>{}</p>", e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::chart::Palette;
    use crate::widget::controller::{ControllerState, ResultSession};

    #[test]
    fn idle_page_shows_form_and_endpoint() {
        let env = init_templates().unwrap();
        let session = ResultSession {
            question: "total <revenue>".to_string(),
            ..ResultSession::default()
        };
        let view = WidgetView::from_session(&session, ControllerState::Idle, &Palette::default());

        let page = render_widget(&env, &view, "http://analytics:3000/api/query");

        assert!(!page.contains("Template Error"));
        assert!(page.contains("analytics:3000"));
        // Question text is escaped
        assert!(page.contains("total &lt;revenue&gt;"));
    }
}
