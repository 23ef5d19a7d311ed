use crate::models::run::Template;
use crate::models::task::LeadTask;

// Literal substitution of the recognized placeholder tokens with the
// lead's contact fields. Unrecognized tokens pass through verbatim; empty
// fields substitute as empty strings. Pure function, no I/O.
pub fn render(template: &str, task: &LeadTask) -> String {
    template
        .replace("{{first_name}}", &task.contact_firstname)
        .replace("{{last_name}}", &task.contact_lastname)
        .replace("{{company}}", &task.company_name)
        .replace("{{last_initial}}", &task.contact_lastinitial)
}

/// Render the invite title and body for one lead with the same substitution.
pub fn render_invite(template: &Template, task: &LeadTask) -> (String, String) {
    (render(&template.title, task), render(&template.body, task))
}
