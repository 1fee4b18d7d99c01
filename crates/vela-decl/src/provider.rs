//! Declaration lookup abstraction.
//!
//! This trait isolates checkers from concrete declaration storage so we can
//! swap in a query system without touching check logic. The in-memory
//! `DeclStore` backs tests and single-file drivers.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::decl::{ClassInfo, TypeDecl, TypedefInfo};

/// Read-only lookup over resolved declarations.
///
/// Implementations must tolerate concurrent readers; the checker itself
/// never writes through this interface.
pub trait DeclProvider {
    fn lookup_class_or_typedef(&self, name: &str) -> Option<TypeDecl>;
}

/// An in-memory declaration table.
#[derive(Default)]
pub struct DeclStore {
    decls: FxHashMap<String, TypeDecl>,
}

impl DeclStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: ClassInfo) -> Arc<ClassInfo> {
        let class = Arc::new(class);
        self.decls
            .insert(class.name.clone(), TypeDecl::Class(Arc::clone(&class)));
        class
    }

    pub fn add_typedef(&mut self, typedef: TypedefInfo) -> Arc<TypedefInfo> {
        let typedef = Arc::new(typedef);
        self.decls
            .insert(typedef.name.clone(), TypeDecl::Typedef(Arc::clone(&typedef)));
        typedef
    }
}

impl DeclProvider for DeclStore {
    fn lookup_class_or_typedef(&self, name: &str) -> Option<TypeDecl> {
        self.decls.get(name).cloned()
    }
}
