//! Atom feed output, written with `quick-xml`.
//!
//! Entry ids reuse the article uid under a fixed URN namespace so feed
//! readers deduplicate on the same identity the cache does.

use crate::models::{Collection, ShoeType};
use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::error::Error;
use std::io;
use tracing::{info, instrument};

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

fn text_element<W: io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn link_element<W: io::Write>(writer: &mut Writer<W>, href: &str) -> Result<(), Box<dyn Error>> {
    let mut link = BytesStart::new("link");
    link.push_attribute(("href", href));
    writer.write_event(Event::Empty(link))?;
    Ok(())
}

/// Render a collection as an Atom feed document.
pub fn render_feed(collection: &Collection, shoe_type: ShoeType) -> Result<String, Box<dyn Error>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut feed = BytesStart::new("feed");
    feed.push_attribute(("xmlns", ATOM_NS));
    writer.write_event(Event::Start(feed))?;

    text_element(
        &mut writer,
        "title",
        &format!("RunRepeat – {}", shoe_type.display_name()),
    )?;
    text_element(&mut writer, "id", &shoe_type.catalog_url())?;
    link_element(&mut writer, &shoe_type.catalog_url())?;

    let updated = collection
        .items
        .iter()
        .map(|item| item.published_at)
        .max()
        .unwrap_or_else(Utc::now);
    text_element(&mut writer, "updated", &updated.to_rfc3339())?;

    if let Some(icon) = &collection.icon {
        text_element(&mut writer, "icon", icon)?;
    }

    for item in &collection.items {
        writer.write_event(Event::Start(BytesStart::new("entry")))?;
        text_element(&mut writer, "id", &format!("urn:runrepeat:{}", item.uid))?;
        text_element(&mut writer, "title", &item.title)?;
        link_element(&mut writer, &item.uri)?;
        text_element(&mut writer, "updated", &item.published_at.to_rfc3339())?;

        writer.write_event(Event::Start(BytesStart::new("author")))?;
        text_element(&mut writer, "name", &item.author)?;
        writer.write_event(Event::End(BytesEnd::new("author")))?;

        let mut content = BytesStart::new("content");
        content.push_attribute(("type", "html"));
        writer.write_event(Event::Start(content))?;
        writer.write_event(Event::Text(BytesText::new(&item.content)))?;
        writer.write_event(Event::End(BytesEnd::new("content")))?;

        writer.write_event(Event::End(BytesEnd::new("entry")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("feed")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

/// Write the Atom feed document to `path`.
#[instrument(level = "info", skip(collection))]
pub async fn write_feed(
    collection: &Collection,
    shoe_type: ShoeType,
    path: &str,
) -> Result<(), Box<dyn Error>> {
    let feed = render_feed(collection, shoe_type)?;
    tokio::fs::write(path, feed).await?;
    info!(%path, items = collection.items.len(), "wrote Atom feed");
    Ok(())
}
