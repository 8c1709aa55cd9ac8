//! Post, message and like schema

use async_graphql::{
    ComplexObject, Context, ErrorExtensions, Object, Result as GraphQLResult, SimpleObject, ID,
};
use tracing::info;
use uuid::Uuid;

use super::pagination::PageRequest;
use super::user::{load_posts, load_user, User};
use super::{parse_id, store};
use crate::db::{MessageRecord, NewMessage, NewPost, PostRecord};
use crate::error::{ApiError, ApiResult};

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Post {
    #[graphql(name = "_id")]
    pub id: ID,
    pub title: String,
    pub image_url: String,
    pub categories: Vec<String>,
    pub description: String,
    pub created_date: String,
    pub likes: i32,
    /// Newest first
    pub messages: Vec<Message>,
    #[graphql(skip)]
    pub created_by_id: Uuid,
}

impl From<PostRecord> for Post {
    fn from(post: PostRecord) -> Self {
        Post {
            id: ID(post.id.to_string()),
            title: post.title,
            image_url: post.image_url,
            categories: post.categories,
            description: post.description,
            created_date: post.created_date.to_rfc3339(),
            likes: post.likes,
            messages: post.messages.into_iter().map(Message::from).collect(),
            created_by_id: post.created_by,
        }
    }
}

#[ComplexObject]
impl Post {
    async fn created_by(&self, ctx: &Context<'_>) -> GraphQLResult<Option<User>> {
        load_user(ctx, self.created_by_id)
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Message {
    #[graphql(name = "_id")]
    pub id: ID,
    pub message_body: String,
    pub message_date: String,
    #[graphql(skip)]
    pub message_user_id: Uuid,
}

impl From<MessageRecord> for Message {
    fn from(message: MessageRecord) -> Self {
        Message {
            id: ID(message.id.to_string()),
            message_body: message.message_body,
            message_date: message.message_date.to_rfc3339(),
            message_user_id: message.message_user,
        }
    }
}

#[ComplexObject]
impl Message {
    async fn message_user(&self, ctx: &Context<'_>) -> GraphQLResult<Option<User>> {
        load_user(ctx, self.message_user_id)
            .await
            .map_err(|e| e.extend())
    }
}

/// One page of the infinite-scroll feed
#[derive(SimpleObject, Clone, Debug)]
pub struct PostsPage {
    pub posts: Vec<Post>,
    pub has_more: bool,
}

/// Result of a like/unlike: the post's new counter and the user's favorites
#[derive(SimpleObject, Clone, Debug)]
pub struct LikesFavorites {
    pub likes: i32,
    pub favorites: Vec<Post>,
}

#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    /// All posts, newest first
    async fn get_posts(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<Post>> {
        let posts = store(ctx)
            .map_err(|e| e.extend())?
            .list_posts(0, None)
            .await
            .map_err(|e| ApiError::from(e).extend())?;

        Ok(posts.into_iter().map(Post::from).collect())
    }

    async fn get_post(&self, ctx: &Context<'_>, post_id: ID) -> GraphQLResult<Option<Post>> {
        get_post(ctx, &post_id).await.map_err(|e| e.extend())
    }

    /// Page `pageNum` (1-based) of `pageSize` posts, newest first
    async fn infinite_scroll_posts(
        &self,
        ctx: &Context<'_>,
        page_num: i32,
        page_size: i32,
    ) -> GraphQLResult<PostsPage> {
        infinite_scroll_posts(ctx, page_num, page_size)
            .await
            .map_err(|e| e.extend())
    }
}

async fn get_post(ctx: &Context<'_>, post_id: &ID) -> ApiResult<Option<Post>> {
    let post_id = parse_id(post_id, "postId")?;
    let post = store(ctx)?.find_post(post_id).await?;
    Ok(post.map(Post::from))
}

async fn infinite_scroll_posts(
    ctx: &Context<'_>,
    page_num: i32,
    page_size: i32,
) -> ApiResult<PostsPage> {
    let page = PageRequest::new(page_num, page_size).map_err(ApiError::Validation)?;
    let store = store(ctx)?;

    let posts = store.list_posts(page.offset(), Some(page.limit())).await?;
    let total = store.count_posts().await?;

    Ok(PostsPage {
        posts: posts.into_iter().map(Post::from).collect(),
        has_more: page.has_more(total),
    })
}

#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    async fn add_post(
        &self,
        ctx: &Context<'_>,
        title: String,
        image_url: String,
        categories: Vec<String>,
        description: String,
        creator_id: ID,
    ) -> GraphQLResult<Post> {
        add_post(
            ctx,
            NewPostArgs {
                title,
                image_url,
                categories,
                description,
                creator_id,
            },
        )
        .await
        .map_err(|e| e.extend())
    }

    /// Prepend a message to a post and return it
    async fn add_post_message(
        &self,
        ctx: &Context<'_>,
        message_body: String,
        user_id: ID,
        post_id: ID,
    ) -> GraphQLResult<Message> {
        add_post_message(ctx, message_body, &user_id, &post_id)
            .await
            .map_err(|e| e.extend())
    }

    async fn like_post(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        username: String,
    ) -> GraphQLResult<LikesFavorites> {
        toggle_like(ctx, &post_id, &username, LikeAction::Like)
            .await
            .map_err(|e| e.extend())
    }

    async fn unlike_post(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        username: String,
    ) -> GraphQLResult<LikesFavorites> {
        toggle_like(ctx, &post_id, &username, LikeAction::Unlike)
            .await
            .map_err(|e| e.extend())
    }
}

struct NewPostArgs {
    title: String,
    image_url: String,
    categories: Vec<String>,
    description: String,
    creator_id: ID,
}

async fn add_post(ctx: &Context<'_>, args: NewPostArgs) -> ApiResult<Post> {
    let created_by = parse_id(&args.creator_id, "creatorId")?;

    let post = store(ctx)?
        .insert_post(NewPost {
            title: args.title,
            image_url: args.image_url,
            categories: args.categories,
            description: args.description,
            created_by,
        })
        .await?;

    info!(post_id = %post.id, creator_id = %created_by, "Post created");
    Ok(Post::from(post))
}

async fn add_post_message(
    ctx: &Context<'_>,
    message_body: String,
    user_id: &ID,
    post_id: &ID,
) -> ApiResult<Message> {
    let message_user = parse_id(user_id, "userId")?;
    let post_id = parse_id(post_id, "postId")?;

    let message = store(ctx)?
        .prepend_message(
            post_id,
            NewMessage {
                message_body,
                message_user,
            },
        )
        .await?
        .ok_or(ApiError::PostNotFound)?;

    info!(post_id = %post_id, user_id = %message_user, "Message added");
    Ok(Message::from(message))
}

#[derive(Clone, Copy, Debug)]
enum LikeAction {
    Like,
    Unlike,
}

/// Counter update then favorites update: two independent single-record
/// writes with no transaction between them.
async fn toggle_like(
    ctx: &Context<'_>,
    post_id: &ID,
    username: &str,
    action: LikeAction,
) -> ApiResult<LikesFavorites> {
    let post_id = parse_id(post_id, "postId")?;
    let store = store(ctx)?;

    let delta = match action {
        LikeAction::Like => 1,
        LikeAction::Unlike => -1,
    };
    let likes = store
        .add_likes(post_id, delta)
        .await?
        .ok_or(ApiError::PostNotFound)?;

    let favorites = match action {
        LikeAction::Like => store.add_favorite(username, post_id).await?,
        LikeAction::Unlike => store.remove_favorite(username, post_id).await?,
    }
    .ok_or(ApiError::UserNotFound)?;

    info!(post_id = %post_id, username = %username, likes, ?action, "Like toggled");

    Ok(LikesFavorites {
        likes,
        favorites: load_posts(ctx, &favorites).await?,
    })
}
