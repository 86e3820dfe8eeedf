//! Bridge from catalog tools to Rig's `Tool` trait
//!
//! | Aspect | Catalog [`Tool`] | `rig::tool::Tool` |
//! |--------|------------------|-------------------|
//! | Name | `definition().name` | `const NAME` (from [`NamedTool`]) |
//! | Args / Output | `serde_json::Value` | `serde_json::Value` |
//! | Context | passed per call | bound at construction |
//!
//! ```rust,ignore
//! let agent = client
//!     .agent("llama3.2")
//!     .tool(RigTool::new(SayHello, context.clone()))
//!     .build();
//! ```

use rig::completion::ToolDefinition as RigToolDefinition;

use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tools::{NamedTool, Tool};

/// A catalog tool bound to the context it runs with under a Rig agent.
pub struct RigTool<T> {
    inner: T,
    context: ToolContext,
}

impl<T> RigTool<T>
where
    T: Tool + NamedTool,
{
    pub fn new(inner: T, context: ToolContext) -> Self {
        Self { inner, context }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> rig::tool::Tool for RigTool<T>
where
    T: Tool + NamedTool + 'static,
{
    const NAME: &'static str = T::NAME;

    type Error = ToolError;
    type Args = serde_json::Value;
    type Output = serde_json::Value;

    async fn definition(&self, _prompt: String) -> RigToolDefinition {
        let def = self.inner.definition();
        RigToolDefinition {
            name: def.name,
            description: def.description,
            parameters: def.parameters,
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        self.inner.execute(args, &self.context).await
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for RigTool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RigTool")
            .field("inner", &self.inner)
            .field("context", &self.context)
            .finish()
    }
}
