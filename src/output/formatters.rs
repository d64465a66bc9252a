use anyhow::Context;
use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use super::{field_union, ExportOptions};
use crate::pipeline::Record;
use crate::utils::truncate_with_ellipsis;
use crate::Result;

/// Longest transcript kept verbatim in an RSS item description
const RSS_SNIPPET_CHARS: usize = 500;

const UNTITLED_VIDEO: &str = "Untitled video";

const HTML_STYLE: &str = "<style>\
body { font-family: Arial, sans-serif; padding: 16px; }\
table { border-collapse: collapse; width: 100%; }\
th, td { border: 1px solid #ddd; padding: 8px; vertical-align: top; }\
th { background-color: #f5f5f5; text-align: left; }\
tr:nth-child(even) { background-color: #fbfbfb; }\
</style>";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Format records as a pretty-printed JSON array, keeping non-ASCII text as-is
pub fn format_as_json(records: &[Record]) -> Result<String> {
    serde_json::to_string_pretty(records).context("Failed to serialize records as JSON")
}

/// Format records as CSV with a header row taken from the field union
pub fn format_as_csv(records: &[Record]) -> Result<String> {
    let mut columns = field_union(records);
    if columns.is_empty() {
        columns = Record::FIELD_NAMES.to_vec();
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for record in records {
        writer.write_record(columns.iter().map(|column| record.field(column).unwrap_or("")))?;
    }
    writer.flush()?;

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Format records as XML: `<root_tag>` holding one `<item_tag>` per record
pub fn format_as_xml(records: &[Record], root_tag: &str, item_tag: &str) -> Result<String> {
    validate_tag_name(root_tag)?;
    validate_tag_name(item_tag)?;

    let columns = field_union(records);
    let mut writer = new_xml_writer()?;

    writer.write_event(Event::Start(BytesStart::new(root_tag)))?;
    for record in records {
        writer.write_event(Event::Start(BytesStart::new(item_tag)))?;
        for column in &columns {
            write_text_element(&mut writer, column, record.field(column))?;
        }
        writer.write_event(Event::End(BytesEnd::new(item_tag)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(root_tag)))?;

    finish_xml(writer)
}

/// Format records as a self-contained HTML page with a table
pub fn format_as_html(records: &[Record], title: &str, generated_at: DateTime<Utc>) -> String {
    let columns = field_union(records);
    let title = escape(title);
    let generated = generated_at.format("%Y-%m-%dT%H:%M:%SZ").to_string();

    let mut html: Vec<String> = vec![
        "<!DOCTYPE html>".to_string(),
        "<html lang=\"en\">".to_string(),
        "<head>".to_string(),
        "<meta charset=\"UTF-8\" />".to_string(),
        format!("<title>{}</title>", title),
        HTML_STYLE.to_string(),
        "</head>".to_string(),
        "<body>".to_string(),
        format!("<h1>{}</h1>", title),
        format!("<p>Generated at: {}</p>", escape(generated.as_str())),
    ];

    if columns.is_empty() {
        html.push("<p>No data to display.</p>".to_string());
    } else {
        html.push("<table>".to_string());
        html.push("<thead><tr>".to_string());
        for column in &columns {
            html.push(format!("<th>{}</th>", escape(*column)));
        }
        html.push("</tr></thead>".to_string());
        html.push("<tbody>".to_string());
        for record in records {
            html.push("<tr>".to_string());
            for column in &columns {
                html.push(format!("<td>{}</td>", escape(record.field(column).unwrap_or(""))));
            }
            html.push("</tr>".to_string());
        }
        html.push("</tbody></table>".to_string());
    }

    html.push("</body></html>".to_string());
    html.join("\n")
}

/// Format records as an RSS 2.0 feed, one item per record
pub fn format_as_rss(
    records: &[Record],
    options: &ExportOptions,
    published_at: DateTime<Utc>,
) -> Result<String> {
    let mut writer = new_xml_writer()?;

    writer.write_event(Event::Start(
        BytesStart::new("rss").with_attributes([("version", "2.0")]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, "title", Some(options.channel_title.as_str()))?;
    write_text_element(&mut writer, "link", Some(options.channel_link.as_str()))?;
    write_text_element(&mut writer, "description", Some(options.channel_description.as_str()))?;
    let pub_date = published_at.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
    write_text_element(&mut writer, "pubDate", Some(pub_date.as_str()))?;

    for record in records {
        let item = RssItem::from_record(record);

        writer.write_event(Event::Start(BytesStart::new("item")))?;
        write_text_element(&mut writer, "title", Some(item.title.as_str()))?;
        write_text_element(&mut writer, "link", Some(item.link.as_str()))?;
        write_text_element(&mut writer, "description", Some(item.description.as_str()))?;
        write_text_element(&mut writer, "guid", Some(item.guid.as_str()))?;
        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    finish_xml(writer)
}

/// Feed entry derived from one record
#[derive(Debug, Clone, PartialEq)]
pub struct RssItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub guid: String,
}

impl RssItem {
    pub fn from_record(record: &Record) -> Self {
        let title = record
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED_VIDEO)
            .to_string();
        let link = record.target_url.clone();

        let mut parts = Vec::new();
        if let Some(views) = record.views.as_deref().filter(|v| !v.is_empty()) {
            parts.push(format!("Views: {}", views));
        }
        if let Some(transcript) = record.transcript.as_deref().filter(|t| !t.is_empty()) {
            parts.push(format!(
                "Transcript snippet: {}",
                truncate_with_ellipsis(transcript, RSS_SNIPPET_CHARS)
            ));
        }

        let guid = if link.is_empty() { title.clone() } else { link.clone() };

        Self {
            title,
            link,
            description: parts.join(" | "),
            guid,
        }
    }
}

fn new_xml_writer() -> Result<XmlWriter> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

fn finish_xml(writer: XmlWriter) -> Result<String> {
    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

/// `<name>text</name>`, or `<name/>` for a null value
fn write_text_element(writer: &mut XmlWriter, name: &str, text: Option<&str>) -> Result<()> {
    match text {
        Some(text) => {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            writer.write_event(Event::Text(BytesText::new(text)))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        None => {
            writer.write_event(Event::Empty(BytesStart::new(name)))?;
        }
    }
    Ok(())
}

fn validate_tag_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if !(valid_start && valid_rest) {
        anyhow::bail!("Invalid XML element name: '{}'", name);
    }
    Ok(())
}
