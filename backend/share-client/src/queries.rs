//! GraphQL documents dispatched by the client store

pub const GET_CURRENT_USER: &str = r#"
query {
  getCurrentUser {
    _id
    username
    email
    joinDate
    favorites {
      _id
      title
      imageUrl
    }
  }
}
"#;

pub const GET_POSTS: &str = r#"
query {
  getPosts {
    _id
    title
    imageUrl
  }
}
"#;

pub const ADD_POST: &str = r#"
mutation(
  $title: String!
  $imageUrl: String!
  $categories: [String!]!
  $description: String!
  $creatorId: ID!
) {
  addPost(
    title: $title
    imageUrl: $imageUrl
    categories: $categories
    description: $description
    creatorId: $creatorId
  ) {
    _id
    title
    imageUrl
    categories
    description
  }
}
"#;

pub const SIGNIN_USER: &str = r#"
mutation($username: String!, $password: String!) {
  signinUser(username: $username, password: $password) {
    token
  }
}
"#;

pub const SIGNUP_USER: &str = r#"
mutation($username: String!, $email: String!, $password: String!) {
  signupUser(username: $username, email: $email, password: $password) {
    token
  }
}
"#;
