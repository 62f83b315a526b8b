use ctx7_core::client::{CodeDocs, Docs, DocsMetadata, InfoDocs, Library, Pagination, TextDocs};
use std::fmt::Write;

pub fn docs_to_markdown(docs: &Docs) -> String {
    let mut md = heading(docs.metadata());
    md.push_str(&match docs {
        Docs::Code(code) => code_to_markdown(code),
        Docs::Info(info) => info_to_markdown(info),
        Docs::Text(text) => text_to_markdown(text),
    });
    md.push_str(&pagination_line(docs.pagination()));
    md
}

fn heading(metadata: &DocsMetadata) -> String {
    if metadata.library_id.is_empty() {
        return String::new();
    }
    match metadata.version.as_deref() {
        Some(version) => format!("# {} ({version})\n\n", metadata.library_id),
        None => format!("# {}\n\n", metadata.library_id),
    }
}

fn code_to_markdown(docs: &CodeDocs) -> String {
    let mut md = String::new();
    for snippet in &docs.snippets {
        let _ = writeln!(md, "## {}\n", snippet.code_title);
        if !snippet.code_description.is_empty() {
            let _ = writeln!(md, "{}\n", snippet.code_description);
        }
        if !snippet.code_id.is_empty() {
            let _ = writeln!(md, "Source: {}\n", snippet.code_id);
        }
        for example in &snippet.code_list {
            let _ = writeln!(md, "```{}\n{}\n```\n", example.language, example.code.trim_end());
        }
    }
    if docs.snippets.is_empty() {
        md.push_str("No code snippets found.\n");
    }
    md
}

fn info_to_markdown(docs: &InfoDocs) -> String {
    let mut md = String::new();
    for snippet in &docs.snippets {
        if !snippet.breadcrumb.is_empty() {
            let _ = writeln!(md, "## {}\n", snippet.breadcrumb);
        }
        let _ = writeln!(md, "{}\n", snippet.content.trim());
        if !snippet.page_id.is_empty() {
            let _ = writeln!(md, "Source: {}\n", snippet.page_id);
        }
    }
    if docs.snippets.is_empty() {
        md.push_str("No documentation pages found.\n");
    }
    md
}

fn text_to_markdown(docs: &TextDocs) -> String {
    let content = docs.content.trim();
    if content.is_empty() {
        "No documentation found.\n".to_string()
    } else {
        format!("{content}\n")
    }
}

fn pagination_line(p: &Pagination) -> String {
    let mut line = format!("\n---\n*Page {} of {}*", p.page, p.total_pages.max(p.page));
    if p.has_next {
        line.push_str(&format!(" *(next: --page {})*", p.page + 1));
    }
    line.push('\n');
    line
}

pub fn library_line(lib: &Library) -> String {
    let mut details = vec![];
    if let Some(snippets) = lib.total_snippets {
        details.push(format!("{snippets} snippets"));
    }
    if let Some(score) = lib.trust_score.filter(|s| *s >= 0.0) {
        details.push(format!("trust {score}"));
    }
    if !lib.versions.is_empty() {
        details.push(format!("versions: {}", lib.versions.join(", ")));
    }

    if details.is_empty() {
        lib.title.clone()
    } else {
        format!("{} ({})", lib.title, details.join(", "))
    }
}
