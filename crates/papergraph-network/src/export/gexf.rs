//! GEXF 1.2 graph files (readable by Gephi)

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::create_file;
use crate::graph::CoauthorGraph;

const GEXF_NS: &str = "http://www.gexf.net/1.2draft";

/// Node attribute columns: (id, title, type)
const NODE_ATTRIBUTES: [(&str, &str, &str); 4] = [
    ("0", "name", "string"),
    ("1", "orcid", "string"),
    ("2", "institution", "string"),
    ("3", "publications", "long"),
];

/// Write `graph` as an undirected weighted GEXF file.
pub fn write_gexf(path: &Path, graph: &CoauthorGraph, description: &str) -> anyhow::Result<()> {
    let out = create_file(path)?;
    let mut out = write_gexf_to(out, graph, description)
        .with_context(|| format!("writing {}", path.display()))?;
    out.flush()?;
    log::info!(
        "Saved {} ({} nodes, {} edges)",
        path.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(())
}

/// Serialize `graph` into `inner` and hand it back.
///
/// Missing attribute values are written as empty strings.
pub fn write_gexf_to<W: Write>(
    inner: W,
    graph: &CoauthorGraph,
    description: &str,
) -> anyhow::Result<W> {
    let mut w = Writer::new_with_indent(inner, b' ', 2);

    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.write_event(Event::Start(
        BytesStart::new("gexf").with_attributes([("xmlns", GEXF_NS), ("version", "1.2")]),
    ))?;

    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    w.write_event(Event::Start(
        BytesStart::new("meta").with_attributes([("lastmodifieddate", today.as_str())]),
    ))?;
    text_element(&mut w, "creator", "papergraph")?;
    text_element(&mut w, "description", description)?;
    w.write_event(Event::End(BytesEnd::new("meta")))?;

    w.write_event(Event::Start(BytesStart::new("graph").with_attributes([
        ("defaultedgetype", "undirected"),
        ("mode", "static"),
    ])))?;

    w.write_event(Event::Start(
        BytesStart::new("attributes").with_attributes([("class", "node"), ("mode", "static")]),
    ))?;
    for (id, title, kind) in NODE_ATTRIBUTES {
        w.write_event(Event::Empty(BytesStart::new("attribute").with_attributes([
            ("id", id),
            ("title", title),
            ("type", kind),
        ])))?;
    }
    w.write_event(Event::End(BytesEnd::new("attributes")))?;

    w.write_event(Event::Start(BytesStart::new("nodes")))?;
    for node in graph.nodes() {
        let label = if node.name.is_empty() {
            node.id.as_str()
        } else {
            node.name.as_str()
        };
        w.write_event(Event::Start(
            BytesStart::new("node").with_attributes([("id", node.id.as_str()), ("label", label)]),
        ))?;
        w.write_event(Event::Start(BytesStart::new("attvalues")))?;
        let publications = node.publications.to_string();
        let values = [
            node.name.as_str(),
            node.orcid.as_deref().unwrap_or(""),
            node.institution.as_deref().unwrap_or(""),
            publications.as_str(),
        ];
        for ((id, _, _), value) in NODE_ATTRIBUTES.iter().zip(values) {
            w.write_event(Event::Empty(
                BytesStart::new("attvalue").with_attributes([("for", *id), ("value", value)]),
            ))?;
        }
        w.write_event(Event::End(BytesEnd::new("attvalues")))?;
        w.write_event(Event::End(BytesEnd::new("node")))?;
    }
    w.write_event(Event::End(BytesEnd::new("nodes")))?;

    w.write_event(Event::Start(BytesStart::new("edges")))?;
    for (i, edge) in graph.edges().iter().enumerate() {
        let id = i.to_string();
        let weight = edge.weight.to_string();
        w.write_event(Event::Empty(BytesStart::new("edge").with_attributes([
            ("id", id.as_str()),
            ("source", edge.source.as_str()),
            ("target", edge.target.as_str()),
            ("weight", weight.as_str()),
        ])))?;
    }
    w.write_event(Event::End(BytesEnd::new("edges")))?;

    w.write_event(Event::End(BytesEnd::new("graph")))?;
    w.write_event(Event::End(BytesEnd::new("gexf")))?;

    Ok(w.into_inner())
}

fn text_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> anyhow::Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::AuthorNode;
    use crate::graph::CoauthorEdge;
    use tempfile::TempDir;

    fn graph() -> CoauthorGraph {
        let mut a = AuthorNode::new("A1", "Zoë & Co <lab>");
        a.publications = 4;
        a.institution = Some("Home U".into());
        let b = AuthorNode::new("A2", "");
        CoauthorGraph::from_parts(vec![a, b], vec![CoauthorEdge::new("A1", "A2", 3)]).unwrap()
    }

    fn render(graph: &CoauthorGraph) -> String {
        let bytes = write_gexf_to(Vec::new(), graph, "test").unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn document_structure() {
        let xml = render(&graph());
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<gexf xmlns="http://www.gexf.net/1.2draft" version="1.2">"#));
        assert!(xml.contains(r#"defaultedgetype="undirected""#));
        assert!(xml.contains(r#"<attribute id="3" title="publications" type="long"/>"#));
        assert!(xml.contains(r#"<edge id="0" source="A1" target="A2" weight="3"/>"#));
        assert!(xml.trim_end().ends_with("</gexf>"));
    }

    #[test]
    fn attribute_values_escaped_and_missing_empty() {
        let xml = render(&graph());
        assert!(xml.contains("Zoë &amp; Co &lt;lab&gt;"));
        assert!(xml.contains(r#"<attvalue for="1" value=""/>"#));
        assert!(xml.contains(r#"<attvalue for="2" value="Home U"/>"#));
        assert!(xml.contains(r#"<attvalue for="3" value="4"/>"#));
    }

    #[test]
    fn unnamed_node_labelled_by_id() {
        let xml = render(&graph());
        assert!(xml.contains(r#"<node id="A2" label="A2">"#));
    }

    #[test]
    fn parses_back() {
        let xml = render(&graph());
        let mut reader = quick_xml::Reader::from_str(&xml);
        let (mut nodes, mut edges) = (0, 0);
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"node" => nodes += 1,
                Event::Empty(e) if e.name().as_ref() == b"edge" => edges += 1,
                Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!((nodes, edges), (2, 1));
    }

    #[test]
    fn writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("net.gexf");
        write_gexf(&path, &graph(), "test").unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("<nodes>"));
    }
}
