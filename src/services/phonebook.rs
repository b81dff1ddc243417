//! Yealink phonebook XML rendering.
//!
//! Desk phones poll this document for contact auto-provisioning. Only the
//! name and extension are emitted; email, tags, and the agent flag stay in
//! the JSON surface.

use quick_xml::escape::escape;

use crate::services::directory::Contact;

/// UTF-8 XML prolog emitted before every document.
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Render the phonebook document for a contact list. Infallible.
pub fn render_phonebook(contacts: &[Contact]) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str("<YealinkIPPhoneDirectory>");
    for contact in contacts {
        xml.push_str("<DirectoryEntry>");
        xml.push_str("<Name>");
        xml.push_str(&escape(&contact.name));
        xml.push_str("</Name>");
        xml.push_str("<Telephone>");
        xml.push_str(&escape(&contact.extension));
        xml.push_str("</Telephone>");
        xml.push_str("</DirectoryEntry>");
    }
    xml.push_str("</YealinkIPPhoneDirectory>");
    xml
}

/// Render the minimal well-formed error document for a failed request.
pub fn render_error(message: &str) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str("<Error>");
    xml.push_str(&escape(message));
    xml.push_str("</Error>");
    xml
}
