//! Zip bundles holding the whole dashboard.
//!
//! A bundle contains `data.json`, the group tree as a pretty-printed JSON array with nested
//! links, and `images/<filename>` for every image a link references.
//!
//! Import is destructive: the store is wiped and rebuilt from the bundle. The archive is fully
//! read and parsed before anything is deleted, so a malformed bundle never costs data.

use crate::api::models::groups::GroupCreate;
use crate::api::models::links::LinkCreate;
use crate::editor::{DashboardApi, SyncError, Tree};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use thiserror::Error;
use tracing::{info, instrument, warn};
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

pub const DATA_FILE: &str = "data.json";
pub const IMAGES_DIR: &str = "images/";

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Archive does not contain {DATA_FILE}")]
    MissingData,

    #[error("Malformed {DATA_FILE}: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

pub type Result<T> = std::result::Result<T, BundleError>;

/// Decoded bundle contents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    pub tree: Tree,
    /// `(filename, bytes)` pairs found under `images/`
    pub images: Vec<(String, Vec<u8>)>,
}

/// Name for an export taken at `now`, e.g. `hyperspace-export-20240601-093000.zip`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("hyperspace-export-{}.zip", now.format("%Y%m%d-%H%M%S"))
}

pub fn write_bundle(bundle: &Bundle) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(DATA_FILE, options)?;
    zip.write_all(&serde_json::to_vec_pretty(&bundle.tree)?)?;

    for (name, content) in &bundle.images {
        zip.start_file(format!("{IMAGES_DIR}{name}"), options)?;
        zip.write_all(content)?;
    }

    Ok(zip.finish()?.into_inner())
}

pub fn read_bundle(archive: &[u8]) -> Result<Bundle> {
    let mut archive = ZipArchive::new(Cursor::new(archive))?;
    let mut data = None;
    let mut images = Vec::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }

        let name = file.name().replace('\\', "/");
        let mut content = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut content)?;

        if name == DATA_FILE {
            data = Some(content);
        } else if let Some(image) = name.strip_prefix(IMAGES_DIR).filter(|n| !n.is_empty()) {
            images.push((image.to_string(), content));
        }
    }

    let data = data.ok_or(BundleError::MissingData)?;
    let tree = serde_json::from_slice(&data)?;
    Ok(Bundle { tree, images })
}

/// Package `tree` and the images it references.
///
/// Each distinct image is fetched once; a failed fetch is logged and the image left out.
#[instrument(skip_all, fields(groups = tree.groups().len()))]
pub async fn export<A: DashboardApi + ?Sized>(api: &mut A, tree: &Tree) -> Result<Vec<u8>> {
    let mut images = Vec::new();
    for name in tree.referenced_images() {
        match api.fetch_image(&name).await {
            Ok(content) => images.push((name, content)),
            Err(e) => warn!(image = %name, "Skipping image in export: {}", e),
        }
    }

    info!(images = images.len(), "Writing export bundle");
    write_bundle(&Bundle {
        tree: tree.clone(),
        images,
    })
}

/// Replace the store's contents with the bundle and return the reloaded tree.
///
/// Images are re-uploaded first; the store may rename them, so link `imageurl`s are rewritten
/// through the resulting mapping. A link whose image is not in the bundle loses its image.
#[instrument(skip_all, fields(size = archive.len()))]
pub async fn import<A: DashboardApi + ?Sized>(api: &mut A, archive: &[u8]) -> Result<Tree> {
    let bundle = read_bundle(archive)?;

    api.wipe().await?;

    let mut stored_names = HashMap::new();
    for (name, content) in bundle.images {
        let stored = api.upload_image(&name, content).await?;
        stored_names.insert(name, stored);
    }

    for group in bundle.tree.into_groups() {
        let created = api
            .create_group(&GroupCreate {
                title: group.title,
                orderby: Some(group.orderby),
            })
            .await?;

        for link in group.links {
            let imageurl = link.imageurl.as_ref().and_then(|name| stored_names.get(name)).cloned();
            api.create_link(&LinkCreate {
                group_id: created.id,
                title: link.title,
                link: link.link,
                imageurl,
                notes: link.notes,
                orderby: Some(link.orderby),
            })
            .await?;
        }
    }

    let tree = Tree::from(api.list_tree().await?);
    info!(groups = tree.groups().len(), images = stored_names.len(), "Imported bundle");
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::memory::MemoryApi;
    use crate::editor::{EditorSession, GroupNode, LinkNode};
    use chrono::TimeZone;

    fn with_image(api: &mut MemoryApi, link_id: i32, name: &str, content: &[u8]) {
        api.links.get_mut(&link_id).unwrap().imageurl = Some(name.to_string());
        api.images.insert(name.to_string(), content.to_vec());
    }

    fn seeded() -> MemoryApi {
        let mut api = MemoryApi::default();
        let apps = api.seed_group("Apps", 0);
        let media = api.seed_group("Media", 1);
        let mail = api.seed_link(apps, "Mail", 0);
        let calendar = api.seed_link(apps, "Calendar", 1);
        let music = api.seed_link(media, "Music", 0);
        with_image(&mut api, mail, "mail.png", b"mail-bytes");
        with_image(&mut api, calendar, "mail.png", b"mail-bytes");
        with_image(&mut api, music, "music.png", b"music-bytes");
        api.links.get_mut(&music).unwrap().notes = Some("<p>loud</p>".into());
        api.seed_configuration("Background Image", "bg.jpg");
        api
    }

    /// Tree shape without store-assigned ids or image names
    fn shape(tree: &Tree) -> Vec<(String, i32, Vec<(String, String, Option<String>, i32)>)> {
        tree.groups()
            .iter()
            .map(|g| {
                let links = g
                    .links
                    .iter()
                    .map(|l| (l.title.clone(), l.link.clone(), l.notes.clone(), l.orderby))
                    .collect();
                (g.title.clone(), g.orderby, links)
            })
            .collect()
    }

    #[test]
    fn test_export_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 5).unwrap();
        assert_eq!(export_file_name(at), "hyperspace-export-20240601-093005.zip");
    }

    #[test]
    fn test_read_bundle_requires_data_json() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("images/x.png", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"x").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        assert!(matches!(read_bundle(&bytes), Err(BundleError::MissingData)));
        assert!(matches!(read_bundle(b"not a zip"), Err(BundleError::Archive(_))));
    }

    #[test]
    fn test_read_bundle_rejects_malformed_data() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(DATA_FILE, SimpleFileOptions::default()).unwrap();
        zip.write_all(br#"{"groups": "nope"}"#).unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        assert!(matches!(read_bundle(&bytes), Err(BundleError::Malformed(_))));
    }

    #[test]
    fn test_read_bundle_defaults_null_ranks() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(DATA_FILE, SimpleFileOptions::default()).unwrap();
        zip.write_all(
            br#"[{"id":1,"title":"Apps","orderby":null,"links":[
                {"id":2,"group_id":1,"title":"Mail","link":"https://mail.example","imageurl":null,"notes":null,"orderby":null}
            ]},{"id":3,"title":"Tools","links":null}]"#,
        )
        .unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let bundle = read_bundle(&bytes).unwrap();
        let groups = bundle.tree.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].orderby, 0);
        assert_eq!(groups[0].links[0].orderby, 0);
        assert_eq!(groups[0].links[0].imageurl, None);
        assert!(groups[1].links.is_empty());
    }

    #[test]
    fn test_write_then_read_keeps_tree_and_images() {
        let bundle = Bundle {
            tree: Tree::new(vec![GroupNode {
                id: 1,
                title: "Apps".into(),
                orderby: 0,
                links: vec![LinkNode {
                    id: 2,
                    group_id: Some(1),
                    title: "Mail".into(),
                    link: "https://mail.example".into(),
                    imageurl: Some("mail.png".into()),
                    notes: None,
                    orderby: 0,
                }],
            }]),
            images: vec![("mail.png".into(), b"png".to_vec())],
        };

        assert_eq!(read_bundle(&write_bundle(&bundle).unwrap()).unwrap(), bundle);
    }

    #[tokio::test]
    async fn test_export_fetches_each_image_once_and_skips_failures() {
        let mut api = seeded();
        api.lose_image("music.png");
        let tree = Tree::from(api.list_tree().await.unwrap());

        let archive = export(&mut api, &tree).await.unwrap();
        let bundle = read_bundle(&archive).unwrap();

        assert_eq!(bundle.images, vec![("mail.png".to_string(), b"mail-bytes".to_vec())]);
        assert_eq!(bundle.tree, tree);
    }

    #[tokio::test]
    async fn test_round_trip_into_empty_store() {
        let mut source = EditorSession::load(seeded()).await.unwrap();
        let archive = source.export().await.unwrap();

        let mut target = EditorSession::load(MemoryApi::default()).await.unwrap();
        target.import(&archive).await.unwrap();

        assert_eq!(shape(target.tree()), shape(source.tree()));

        // Every imported image reference resolves in the target store
        let api = target.api();
        for link in api.list_links().await.unwrap() {
            let name = link.imageurl.expect("every seeded link has an image");
            assert!(api.fetch_image(&name).await.is_ok());
        }
        assert!(api.configurations.is_empty());
    }

    #[tokio::test]
    async fn test_import_replaces_existing_data() {
        let mut api = seeded();
        let stale = api.seed_group("Old", 5);
        api.seed_link(stale, "Stale", 0);

        let bundle = Bundle {
            tree: Tree::new(vec![GroupNode {
                id: 99,
                title: "Fresh".into(),
                orderby: 0,
                links: vec![LinkNode {
                    id: 100,
                    group_id: Some(99),
                    title: "Docs".into(),
                    link: "https://docs.example".into(),
                    imageurl: Some("missing.png".into()),
                    notes: None,
                    orderby: 0,
                }],
            }]),
            images: Vec::new(),
        };

        let tree = import(&mut api, &write_bundle(&bundle).unwrap()).await.unwrap();

        assert_eq!(tree.groups().len(), 1);
        assert_eq!(tree.groups()[0].title, "Fresh");
        assert_eq!(tree.groups()[0].links[0].imageurl, None);
        assert_eq!(api.list_links().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_import_does_not_wipe() {
        let mut api = seeded();
        let before = api.list_tree().await.unwrap();

        assert!(import(&mut api, b"garbage").await.is_err());
        assert_eq!(api.list_tree().await.unwrap(), before);
        assert_eq!(api.configurations.len(), 1);
    }
}
