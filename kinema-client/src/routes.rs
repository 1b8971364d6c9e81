macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Account endpoints that live outside the versioned tree
pub mod auth {
    pub const LOGIN: &str = "/api/auth/login";
    pub const REGISTER: &str = "/api/auth/register";
    pub const PROFILE: &str = "/api/user/profile";
}

/// Versioned API route definitions of the learning backend
pub mod v1 {
    pub mod auth {
        pub const REFRESH: &str = v1_path!("/auth/refresh");
    }

    pub mod users {
        pub const COLLECTION: &str = v1_path!("/users");
    }

    pub mod content {
        pub mod topics {
            pub const COLLECTION: &str = v1_path!("/content/topics");
            pub const ITEM: &str = v1_path!("/content/topics/{id}");
            pub const TASKS: &str = v1_path!("/content/topics/{id}/tasks");
        }

        pub mod tasks {
            pub const COLLECTION: &str = v1_path!("/content/tasks");
            pub const ITEM: &str = v1_path!("/content/tasks/{id}");
            pub const PUBLISH: &str = v1_path!("/content/tasks/publish");
            pub const DRAFTS: &str = v1_path!("/content/tasks/drafts");
            pub const PROGRESS: &str = v1_path!("/content/tasks/progress");
            pub const SUBMIT: &str = v1_path!("/content/tasks/{id}/submit");
        }
    }
}

/// Helper utilities for working with route templates
pub mod utils {
    /// Replace a single path parameter (e.g. `"{id}"`) with the provided value.
    ///
    /// The value is percent-encoded as a single path segment.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        let encoded: String =
            url::form_urlencoded::byte_serialize(value.as_ref().as_bytes())
                .collect();
        // form encoding turns spaces into '+', which is literal in a path
        route.replace(param, &encoded.replace('+', "%20"))
    }
}

#[cfg(test)]
mod tests {
    use super::utils::replace_param;
    use super::v1;

    #[test]
    fn replaces_item_id() {
        assert_eq!(
            replace_param(v1::content::tasks::ITEM, "{id}", "42"),
            "/api/v1/content/tasks/42"
        );
    }

    #[test]
    fn encodes_path_segment() {
        assert_eq!(
            replace_param(v1::content::topics::TASKS, "{id}", "a b/c"),
            "/api/v1/content/topics/a%20b%2Fc/tasks"
        );
    }
}
