use std::fmt::{Display, Formatter};
use std::str::FromStr;

use mongodb::bson::Bson;
use rocket::{
    http::{
        impl_from_uri_param_identity,
        uri::fmt::{Path, UriDisplay},
    },
    request::FromParam,
};
use serde::{Deserialize, Serialize};

/// An electable position within an election.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Post {
    Clo,
    CdsPresident,
    FinancialSecretary,
    GeneralSecretary,
    MarshallMale,
    MarshallFemale,
    Provost,
}

impl Post {
    /// Every post, in ballot order.
    pub const ALL: [Post; 7] = [
        Post::Clo,
        Post::CdsPresident,
        Post::FinancialSecretary,
        Post::GeneralSecretary,
        Post::MarshallMale,
        Post::MarshallFemale,
        Post::Provost,
    ];

    /// The machine name, as stored and as used in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Post::Clo => "clo",
            Post::CdsPresident => "cds_president",
            Post::FinancialSecretary => "financial_secretary",
            Post::GeneralSecretary => "general_secretary",
            Post::MarshallMale => "marshall_male",
            Post::MarshallFemale => "marshall_female",
            Post::Provost => "provost",
        }
    }

    /// Human-readable title.
    pub fn label(&self) -> &'static str {
        match self {
            Post::Clo => "CLO (Corps Liaison Officer)",
            Post::CdsPresident => "CDS President",
            Post::FinancialSecretary => "Financial Secretary",
            Post::GeneralSecretary => "General Secretary",
            Post::MarshallMale => "Marshall (Male)",
            Post::MarshallFemale => "Marshall (Female)",
            Post::Provost => "Provost",
        }
    }
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPost(pub String);

impl Display for UnknownPost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown post '{}'", self.0)
    }
}

impl std::error::Error for UnknownPost {}

impl FromStr for Post {
    type Err = UnknownPost;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Post::ALL
            .into_iter()
            .find(|post| post.as_str() == s)
            .ok_or_else(|| UnknownPost(s.to_string()))
    }
}

impl<'a> FromParam<'a> for Post {
    type Error = UnknownPost;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}

impl UriDisplay<Path> for Post {
    fn fmt(&self, formatter: &mut rocket::http::uri::fmt::Formatter<'_, Path>) -> std::fmt::Result {
        formatter.write_value(self.as_str())
    }
}

impl_from_uri_param_identity!([Path] Post);

impl From<Post> for Bson {
    fn from(post: Post) -> Self {
        Bson::String(post.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_serde_representation() {
        for post in Post::ALL {
            assert_eq!(Bson::from(post), Bson::String(post.as_str().to_string()));
            assert_eq!(post.as_str().parse::<Post>(), Ok(post));
        }
    }

    #[test]
    fn unknown_post_is_rejected() {
        assert_eq!(
            "treasurer".parse::<Post>(),
            Err(UnknownPost("treasurer".to_string()))
        );
    }
}
