use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docstash_core::export::{export, import, Bundle};
use docstash_core::extract::{OcrEngine, PlainText};
use docstash_core::model::{new_id, Document, DocumentType, Language};
use docstash_core::{search, Store};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "docstash")]
#[command(about = "Manage and search a local document catalog", long_about = None)]
struct Cli {
    /// Catalog directory
    #[arg(long, default_value = ".docstash")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a file, or every text file under a directory
    Add {
        path: PathBuf,
        /// Folder id to file the documents under
        #[arg(long)]
        folder: Option<String>,
        /// Comma-separated tag names
        #[arg(long)]
        tags: Option<String>,
        #[arg(long, default_value = "eng")]
        language: String,
    },
    /// Ranked full-text search; supports tag:, type: and folder: operators
    Search {
        query: String,
        /// Restrict scoring to postings in this language
        #[arg(long)]
        language: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// List documents
    Ls,
    /// Delete a document and its postings
    Rm { id: String },
    /// Create a folder
    Mkdir {
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Create a tag
    Tag {
        name: String,
        #[arg(long, default_value = "#6b7280")]
        color: String,
    },
    /// Write the catalog to a JSON bundle
    Export {
        #[arg(long)]
        output: PathBuf,
    },
    /// Load a JSON bundle and rebuild the index
    Import {
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Add {
            path,
            folder,
            tags,
            language,
        } => {
            let store = Store::open(&cli.store)?;
            add(&store, &path, folder.as_deref(), tags.as_deref(), &language)
        }
        Commands::Search {
            query,
            language,
            limit,
        } => {
            let store = Store::open_existing(&cli.store)?;
            let lang = language.as_deref().map(Language::from_code);
            let ids = search(&store, &query, lang)?;
            for id in ids.iter().take(limit) {
                if let Some(doc) = store.get_document(id)? {
                    println!("{}\t{}", doc.id, doc.name);
                }
            }
            Ok(())
        }
        Commands::Ls => {
            let store = Store::open_existing(&cli.store)?;
            for doc in store.documents()? {
                println!("{}\t{}\t{} bytes", doc.id, doc.name, doc.size);
            }
            Ok(())
        }
        Commands::Rm { id } => {
            let store = Store::open_existing(&cli.store)?;
            store.delete_document(&id)?;
            Ok(())
        }
        Commands::Mkdir { name, parent } => {
            let store = Store::open(&cli.store)?;
            let folder = store.create_folder(&name, parent.as_deref())?;
            println!("{}", folder.id);
            Ok(())
        }
        Commands::Tag { name, color } => {
            let store = Store::open(&cli.store)?;
            let tag = store.create_tag(&name, &color)?;
            println!("{}", tag.id);
            Ok(())
        }
        Commands::Export { output } => {
            let store = Store::open_existing(&cli.store)?;
            let bundle = export(&store)?;
            fs::write(&output, serde_json::to_string_pretty(&bundle)?)?;
            tracing::info!(path = %output.display(), "catalog exported");
            Ok(())
        }
        Commands::Import { input } => {
            let store = Store::open(&cli.store)?;
            let bundle: Bundle = serde_json::from_str(&fs::read_to_string(&input)?)?;
            import(&store, bundle)?;
            Ok(())
        }
    }
}

fn add(
    store: &Store,
    path: &Path,
    folder: Option<&str>,
    tags: Option<&str>,
    language: &str,
) -> Result<()> {
    let tags: Vec<String> = tags
        .map(|t| {
            t.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let language = Language::from_code(language);

    let mut count = 0usize;
    if path.is_dir() {
        for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file()
                && matches!(
                    p.extension().and_then(|s| s.to_str()),
                    Some("txt") | Some("md")
                )
            {
                add_file(store, p, folder, &tags, language)?;
                count += 1;
            }
        }
    } else {
        add_file(store, path, folder, &tags, language)?;
        count += 1;
    }
    tracing::info!(count, "documents added");
    Ok(())
}

fn add_file(
    store: &Store,
    path: &Path,
    folder: Option<&str>,
    tags: &[String],
    language: Language,
) -> Result<()> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();
    let doc_type = doc_type_for(path);
    let mut doc = Document::new(new_id("doc"), name, doc_type);
    doc.size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    doc.folder_id = folder.map(str::to_string);
    doc.tags = tags.to_vec();
    doc.language = Some(language);

    // Plain text reads straight through; PDFs and images get their text from
    // the OCR/PDF collaborators the application layer plugs in.
    if doc_type == DocumentType::Text {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let extraction = PlainText.recognize(&bytes, &[language], &mut |_| {})?;
        let preview = store.settings()?.preview_chars;
        doc.content = extraction.text.chars().take(preview).collect();
        doc.ocr_text = extraction.text;
    }

    store.save_document(&doc)?;
    println!("{}\t{}", doc.id, doc.name);
    Ok(())
}

fn doc_type_for(path: &Path) -> DocumentType {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
        .as_str()
    {
        "pdf" => DocumentType::Pdf,
        "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" => DocumentType::Image,
        "doc" | "docx" => DocumentType::Doc,
        _ => DocumentType::Text,
    }
}
