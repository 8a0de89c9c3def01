use blogpad_core::favorites::{FavoriteStatus, Toggled};
use blogpad_core::guard::{Decision, View};
use blogpad_core::media::{ImageSelection, StaticProbe, UploadedFile, DEFAULT_FALLBACK_IMAGE_URL};
use blogpad_core::models::{Registration, ThemeMode};
use blogpad_core::posts::MemoryPostStore;
use blogpad_core::storage::MemoryStore;
use blogpad_core::{BlogClient, Error, PostForm};
use pretty_assertions::assert_eq;

type Client = BlogClient<MemoryStore, MemoryPostStore, StaticProbe>;

fn client(store: &MemoryStore, remote: &MemoryPostStore) -> Client {
    BlogClient::new(
        store.clone(),
        remote.clone(),
        StaticProbe(true),
        DEFAULT_FALLBACK_IMAGE_URL,
    )
    .unwrap()
}

fn url_form(client: &Client, title: &str) -> PostForm {
    PostForm {
        title: title.to_string(),
        description: "Hello world".to_string(),
        author: String::new(),
        image: Some(ImageSelection::Url(
            client.images().select_url("https://img.example/hi.png"),
        )),
    }
}

#[tokio::test]
async fn register_login_publish_and_guard_ownership() {
    let store = MemoryStore::new();
    let remote = MemoryPostStore::new();
    let mut ana = client(&store, &remote);

    ana.register(&Registration::new("Ana Lee", "ana@x.com", "1234567890", "secret1"))
        .unwrap();
    let session = ana.login("ana@x.com", "secret1").unwrap();
    assert_eq!(session.username, "ana");
    assert_eq!(
        ana.enter("/create-post").unwrap(),
        Decision::Render(View::CreatePost)
    );

    let form = url_form(&ana, "Hi");
    let published = ana.publish(form).await.unwrap();
    assert!(published.warning.is_none());
    assert_eq!(published.post.author, "ana");
    assert_eq!(published.post.owner_email.as_deref(), Some("ana@x.com"));

    let titles: Vec<String> = ana
        .list_posts()
        .await
        .unwrap()
        .iter()
        .map(|post| post.title.clone())
        .collect();
    assert_eq!(titles, vec!["Hi".to_string()]);
    let counts = ana.author_counts();
    assert_eq!((counts[0].name.as_str(), counts[0].posts), ("ana", 1));

    // A different user on the same device.
    ana.logout().unwrap();
    assert_eq!(
        ana.enter("/dashboard").unwrap(),
        Decision::Redirect(View::Login)
    );
    let bob_store = MemoryStore::new();
    let mut bob = client(&bob_store, &remote);
    bob.register(&Registration::new("Bob Stone", "bob@x.com", "0987654321", "secret2"))
        .unwrap();
    bob.login("bob@x.com", "secret2").unwrap();
    bob.list_posts().await.unwrap();

    let form = url_form(&bob, "Taken over");
    let result = bob.edit(&published.post.id, form).await;
    assert!(matches!(result, Err(Error::Forbidden(_))));
    assert_eq!(bob.posts().cached(), std::slice::from_ref(&published.post));
    assert_eq!(remote.snapshot(), vec![published.post]);
}

#[tokio::test]
async fn logged_out_client_cannot_mutate() {
    let store = MemoryStore::new();
    let remote = MemoryPostStore::new();
    let mut client = client(&store, &remote);

    let form = url_form(&client, "Hi");
    assert!(matches!(client.publish(form).await, Err(Error::Forbidden(_))));
    assert!(remote.snapshot().is_empty());
}

#[tokio::test]
async fn uploaded_image_is_embedded_in_the_post() {
    let store = MemoryStore::new();
    let remote = MemoryPostStore::new();
    let mut client = client(&store, &remote);
    client
        .register(&Registration::new("Ana Lee", "ana@x.com", "1234567890", "secret1"))
        .unwrap();
    client.login("ana@x.com", "secret1").unwrap();

    let mut png = Vec::new();
    image::RgbImage::from_pixel(1600, 900, image::Rgb([10, 120, 200]))
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    let upload = UploadedFile::new("cover.png", "", png);
    let embedded = client.images().ingest_upload(&upload).unwrap();
    assert_eq!((embedded.width(), embedded.height()), (800, 450));

    let form = PostForm {
        image: Some(ImageSelection::Upload(embedded)),
        ..url_form(&client, "With upload")
    };
    let published = client.publish(form).await.unwrap();
    assert!(published.post.image.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn favorites_and_theme_survive_reopen() {
    let store = MemoryStore::new();
    let remote = MemoryPostStore::new();
    let mut first = client(&store, &remote);
    first
        .register(&Registration::new("Ana Lee", "ana@x.com", "1234567890", "secret1"))
        .unwrap();
    first.login("ana@x.com", "secret1").unwrap();
    let form = url_form(&first, "Keep me");
    let post = first.publish(form).await.unwrap().post;

    assert_eq!(first.toggle_favorite(&post).unwrap(), Toggled::Added);
    assert_eq!(first.theme().toggle().unwrap(), ThemeMode::Dark);

    let mut reopened = client(&store, &remote);
    assert_eq!(reopened.favorites(), std::slice::from_ref(&post));
    assert_eq!(reopened.theme().current().unwrap(), ThemeMode::Dark);
    assert!(reopened.session().unwrap().is_some());

    reopened.list_posts().await.unwrap();
    assert_eq!(
        reopened.favorite_statuses(),
        vec![FavoriteStatus::Live(post.clone())]
    );
    assert_eq!(reopened.toggle_favorite(&post).unwrap(), Toggled::Removed);
    assert!(reopened.favorites().is_empty());
}
