use serde::{Deserialize, Serialize};

// A pending invite action tied to one CRM lead. The contact fields are
// derived once during enrichment and not touched afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadTask {
    pub id: String,
    pub text: String,
    pub lead_id: String,
    pub company_name: String,
    pub contact_name: String,
    pub contact_firstname: String,
    pub contact_lastname: String,
    pub contact_lastinitial: String,
    pub contact_email: String,
}

impl LeadTask {
    /// Build an unenriched task from a CRM task record. Contact and company
    /// fields stay empty until `with_lead_details` runs.
    pub fn from_crm(task: CrmTask) -> Self {
        Self {
            id: task.id,
            text: task.text,
            lead_id: task.lead_id,
            company_name: String::new(),
            contact_name: String::new(),
            contact_firstname: String::new(),
            contact_lastname: String::new(),
            contact_lastinitial: String::new(),
            contact_email: String::new(),
        }
    }

    /// Fill company and contact fields from the owning lead record. Uses the
    /// lead's first contact and that contact's first email address.
    pub fn with_lead_details(mut self, lead: &LeadRecord) -> Self {
        self.company_name = lead.display_name.clone();

        if let Some(contact) = lead.contacts.first() {
            let (first, last, initial) = split_contact_name(&contact.name);
            self.contact_name = contact.name.clone();
            self.contact_firstname = first;
            self.contact_lastname = last;
            self.contact_lastinitial = initial;
            self.contact_email = contact
                .emails
                .first()
                .map(|e| e.email.clone())
                .unwrap_or_default();
        }

        self
    }

    pub fn has_contact_email(&self) -> bool {
        !self.contact_email.trim().is_empty()
    }
}

/// Split a contact's full name into first name, last name, and last initial.
/// The last whitespace-separated token is treated as the last name; the
/// initial carries a trailing period ("Silva" -> "S.").
pub fn split_contact_name(name: &str) -> (String, String, String) {
    let parts: Vec<&str> = name.split_whitespace().collect();

    let first = parts.first().copied().unwrap_or("").to_string();
    let last = parts.last().copied().unwrap_or("").to_string();

    let initial = last
        .chars()
        .next()
        .map(|c| format!("{}.", c.to_uppercase()))
        .unwrap_or_default();

    (first, last, initial)
}

// Wire shapes for the Close-style CRM API.

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CrmTask {
    pub id: String,
    pub lead_id: String,
    pub text: String,
    pub is_complete: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TaskListResponse {
    pub data: Vec<CrmTask>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LeadRecord {
    pub display_name: String,
    #[serde(default)]
    pub contacts: Vec<CrmContact>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CrmContact {
    pub name: String,
    #[serde(default)]
    pub emails: Vec<CrmEmail>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CrmEmail {
    pub email: String,
}
