use mbox_nav::sitemap::read_locations;
use mbox_nav::{
    build_index_html, build_sitemaps, classify_archive, parse_podlings, FsArchive,
    IncubatingSet, IndexPageOptions, OutputTemplate, SitemapOptions, INDEX_SENTINEL,
    SITEMAP_SENTINEL,
};
use std::fs;
use std::path::Path;

fn make_list(root: &Path, name: &str, indexed: bool) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("200901.mbox"), b"From nobody\n").unwrap();
    if indexed {
        fs::write(dir.join("listinfo.db"), b"db").unwrap();
    }
}

#[test]
fn test_unindexed_lists_excluded() {
    let tmp = tempfile::tempdir().unwrap();
    make_list(tmp.path(), "foo-dev", true);
    make_list(tmp.path(), "foo-users", false);
    make_list(tmp.path(), "bar-dev", true);

    let archive = FsArchive::new(tmp.path(), "listinfo.db");
    let groups = classify_archive(&archive, &IncubatingSet::empty(), INDEX_SENTINEL, false).unwrap();

    assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["bar", "foo"]);
    assert_eq!(groups.get("foo").unwrap().keys().collect::<Vec<_>>(), vec!["dev"]);
    assert_eq!(groups.get("bar").unwrap().keys().collect::<Vec<_>>(), vec!["dev"]);
}

#[test]
fn test_index_page_from_archive() {
    let tmp = tempfile::tempdir().unwrap();
    make_list(tmp.path(), "www-announce", true);
    make_list(tmp.path(), "httpd-dev", true);
    make_list(tmp.path(), "wombat-dev", true);
    make_list(tmp.path(), "wombat-private", false);

    let podlings = parse_podlings(
        r#"<podlings>
            <podling status="current" resource="wombat" resourceAliases=""/>
            <podling status="graduated" resource="httpd"/>
        </podlings>"#,
    )
    .unwrap();

    let archive = FsArchive::new(tmp.path(), "listinfo.db");
    let groups = classify_archive(&archive, &podlings, INDEX_SENTINEL, false).unwrap();
    let html = build_index_html(&groups, &IndexPageOptions::default()).unwrap();

    assert!(html.contains(r#"<option value="asf-wide">asf-wide</option>"#));
    assert!(html.contains(r#"<option value="wombat.incubator">wombat (incubating)</option>"#));
    assert!(html.contains("<li><h3><a name='asf-wide'>ASF-wide lists:</a></h3>"));
    assert!(html.contains("<li><h3><a name='httpd'>httpd.apache.org lists:</a></h3>"));
    assert!(html.contains("    <li><a href='incubator-wombat-dev/'>dev</a></li>"));
    assert!(html.contains("    <li><a href='httpd-dev/'>dev</a></li>"));
    assert!(!html.contains("private"));
}

#[test]
fn test_sitemaps_from_archive() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("mod_mbox");
    let out = tmp.path().join("out");
    fs::create_dir_all(&out).unwrap();
    make_list(&root, "www-announce", true);
    make_list(&root, "httpd-dev", true);
    make_list(&root, "httpd-cvs", false);

    let archive = FsArchive::new(&root, "listinfo.db");
    let groups = classify_archive(&archive, &IncubatingSet::empty(), SITEMAP_SENTINEL, true).unwrap();
    assert!(groups.get("asf").is_some());
    assert!(groups.get("httpd").unwrap()["dev"].size.unwrap() % 1024 == 0);

    let template = OutputTemplate::parse(out.join("sitemap_index-%d.xml").to_str().unwrap()).unwrap();
    let options = SitemapOptions {
        entry_cap: 1,
        ..SitemapOptions::default()
    };
    let report = build_sitemaps(&groups, &template, &options).unwrap();

    // One entry per file, plus the trailing file opened by the last rollover.
    assert_eq!(report.files.len(), 3);
    assert_eq!(report.total_entries(), 2);
    assert_eq!(
        read_locations(&out.join("sitemap_index-0.xml")).unwrap(),
        vec!["http://mail-archives.apache.org/mod_mbox/www-announce/?format=sitemap"]
    );
    assert_eq!(
        read_locations(&out.join("sitemap_index-1.xml")).unwrap(),
        vec!["http://mail-archives.apache.org/mod_mbox/httpd-dev/?format=sitemap"]
    );
    assert!(read_locations(&out.join("sitemap_index-2.xml")).unwrap().is_empty());
}
