pub mod resolver;

pub use resolver::{
    DependencyResolver, ResolutionContext, ResolutionStatus, ResolvedGraph, ResolvedPackage,
};
