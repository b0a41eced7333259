use std::fmt::Debug;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

use crate::decl::{
    ClassDecl, EnumDecl, FunctionDecl, GlobalDecl, MacroConstant, ObjCCategoryDecl, ObjCClassDecl,
    ObjCProtocolDecl, StructDecl, TypedefDecl, WrappedMacro,
};
use crate::error::Error;
use crate::id::DeclId;
use crate::index_map::{IndexMapKey, UstrIndexMap};
use crate::qualtype::{QualType, TypeRef};

type Result<T, E = Error> = std::result::Result<T, E>;

macro_rules! index_id {
    ($($name:ident),*) => {
        $(
            #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
            pub struct $name(usize);

            impl $name {
                pub fn new(id: usize) -> $name {
                    $name(id)
                }
            }

            impl IndexMapKey for $name {
                fn get(&self) -> usize {
                    self.0
                }
            }
        )*
    };
}

index_id!(
    FunctionId,
    GlobalId,
    StructId,
    EnumId,
    TypedefId,
    ClassId,
    ObjCProtocolId,
    ObjCClassId,
    ObjCCategoryId
);

/// The flat, serializable form of a [`DeclarationIndex`] as written by the indexer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexFile {
    /// Lines (usually `#include`s) the bridge file needs in order to see the declarations
    pub preamble: Vec<String>,
    pub functions: Vec<FunctionDecl>,
    pub globals: Vec<GlobalDecl>,
    pub structs: Vec<StructDecl>,
    pub enums: Vec<EnumDecl>,
    pub typedefs: Vec<TypedefDecl>,
    pub macro_constants: Vec<MacroConstant>,
    pub wrapped_macros: Vec<WrappedMacro>,
    pub classes: Vec<ClassDecl>,
    pub objc_protocols: Vec<ObjCProtocolDecl>,
    pub objc_classes: Vec<ObjCClassDecl>,
    pub objc_categories: Vec<ObjCCategoryDecl>,
}

/// Every native declaration seen by the indexer, in the order it saw them
#[derive(Default, Clone)]
pub struct DeclarationIndex {
    preamble: Vec<String>,
    functions: UstrIndexMap<FunctionDecl, FunctionId>,
    globals: UstrIndexMap<GlobalDecl, GlobalId>,
    structs: UstrIndexMap<StructDecl, StructId>,
    enums: UstrIndexMap<EnumDecl, EnumId>,
    typedefs: UstrIndexMap<TypedefDecl, TypedefId>,
    macro_constants: Vec<MacroConstant>,
    wrapped_macros: Vec<WrappedMacro>,
    classes: UstrIndexMap<ClassDecl, ClassId>,
    objc_protocols: UstrIndexMap<ObjCProtocolDecl, ObjCProtocolId>,
    objc_classes: UstrIndexMap<ObjCClassDecl, ObjCClassId>,
    objc_categories: UstrIndexMap<ObjCCategoryDecl, ObjCCategoryId>,
}

impl Debug for DeclarationIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DeclarationIndex({} functions, {} globals, {} structs, {} enums, {} typedefs, {} macro constants, {} wrapped macros, {} classes, {} objc protocols, {} objc classes, {} objc categories)",
            self.functions.len(),
            self.globals.len(),
            self.structs.len(),
            self.enums.len(),
            self.typedefs.len(),
            self.macro_constants.len(),
            self.wrapped_macros.len(),
            self.classes.len(),
            self.objc_protocols.len(),
            self.objc_classes.len(),
            self.objc_categories.len(),
        )
    }
}

impl From<IndexFile> for DeclarationIndex {
    fn from(file: IndexFile) -> Self {
        let mut index = DeclarationIndex::new();
        index.preamble = file.preamble;
        file.functions.into_iter().for_each(|d| index.insert_function(d));
        file.globals.into_iter().for_each(|d| index.insert_global(d));
        file.structs.into_iter().for_each(|d| index.insert_struct(d));
        file.enums.into_iter().for_each(|d| index.insert_enum(d));
        file.typedefs.into_iter().for_each(|d| index.insert_typedef(d));
        file.macro_constants
            .into_iter()
            .for_each(|d| index.insert_macro_constant(d));
        file.wrapped_macros
            .into_iter()
            .for_each(|d| index.insert_wrapped_macro(d));
        file.classes.into_iter().for_each(|d| index.insert_class(d));
        file.objc_protocols
            .into_iter()
            .for_each(|d| index.insert_objc_protocol(d));
        file.objc_classes
            .into_iter()
            .for_each(|d| index.insert_objc_class(d));
        file.objc_categories
            .into_iter()
            .for_each(|d| index.insert_objc_category(d));
        index
    }
}

impl DeclarationIndex {
    pub fn new() -> Self {
        DeclarationIndex::default()
    }

    pub fn from_json_str(json: &str) -> Result<DeclarationIndex> {
        let file: IndexFile = serde_json::from_str(json)?;
        Ok(file.into())
    }

    #[instrument(level = "trace", skip_all)]
    pub fn read(path: impl AsRef<Path>) -> Result<DeclarationIndex> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| Error::FailedToReadIndex {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;

        DeclarationIndex::from_json_str(&contents).map_err(|e| Error::FailedToReadIndex {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    }

    pub fn preamble(&self) -> &[String] {
        &self.preamble
    }

    pub fn functions(&self) -> &UstrIndexMap<FunctionDecl, FunctionId> {
        &self.functions
    }

    pub fn globals(&self) -> &UstrIndexMap<GlobalDecl, GlobalId> {
        &self.globals
    }

    pub fn structs(&self) -> &UstrIndexMap<StructDecl, StructId> {
        &self.structs
    }

    pub fn enums(&self) -> &UstrIndexMap<EnumDecl, EnumId> {
        &self.enums
    }

    pub fn typedefs(&self) -> &UstrIndexMap<TypedefDecl, TypedefId> {
        &self.typedefs
    }

    pub fn macro_constants(&self) -> &[MacroConstant] {
        &self.macro_constants
    }

    pub fn wrapped_macros(&self) -> &[WrappedMacro] {
        &self.wrapped_macros
    }

    pub fn classes(&self) -> &UstrIndexMap<ClassDecl, ClassId> {
        &self.classes
    }

    pub fn objc_protocols(&self) -> &UstrIndexMap<ObjCProtocolDecl, ObjCProtocolId> {
        &self.objc_protocols
    }

    pub fn objc_classes(&self) -> &UstrIndexMap<ObjCClassDecl, ObjCClassId> {
        &self.objc_classes
    }

    pub fn objc_categories(&self) -> &UstrIndexMap<ObjCCategoryDecl, ObjCCategoryId> {
        &self.objc_categories
    }

    pub fn add_preamble(&mut self, line: &str) {
        self.preamble.push(line.to_string());
    }

    pub fn insert_function(&mut self, decl: FunctionDecl) {
        self.functions.insert(decl.id.into(), decl);
    }

    pub fn insert_global(&mut self, decl: GlobalDecl) {
        self.globals.insert(decl.id.into(), decl);
    }

    pub fn insert_struct(&mut self, decl: StructDecl) {
        self.structs.insert(decl.id.into(), decl);
    }

    pub fn insert_enum(&mut self, decl: EnumDecl) {
        self.enums.insert(decl.id.into(), decl);
    }

    pub fn insert_typedef(&mut self, decl: TypedefDecl) {
        self.typedefs.insert(decl.id.into(), decl);
    }

    pub fn insert_macro_constant(&mut self, decl: MacroConstant) {
        self.macro_constants.push(decl);
    }

    pub fn insert_wrapped_macro(&mut self, decl: WrappedMacro) {
        self.wrapped_macros.push(decl);
    }

    pub fn insert_class(&mut self, decl: ClassDecl) {
        self.classes.insert(decl.id.into(), decl);
    }

    pub fn insert_objc_protocol(&mut self, decl: ObjCProtocolDecl) {
        self.objc_protocols.insert(decl.id.into(), decl);
    }

    pub fn insert_objc_class(&mut self, decl: ObjCClassDecl) {
        self.objc_classes.insert(decl.id.into(), decl);
    }

    pub fn insert_objc_category(&mut self, decl: ObjCCategoryDecl) {
        self.objc_categories.insert(decl.id.into(), decl);
    }

    pub fn get_function(&self, id: DeclId) -> Option<&FunctionDecl> {
        self.functions.get(id.as_ref())
    }

    pub fn get_global(&self, id: DeclId) -> Option<&GlobalDecl> {
        self.globals.get(id.as_ref())
    }

    pub fn get_struct(&self, id: DeclId) -> Option<&StructDecl> {
        self.structs.get(id.as_ref())
    }

    pub fn get_enum(&self, id: DeclId) -> Option<&EnumDecl> {
        self.enums.get(id.as_ref())
    }

    pub fn get_typedef(&self, id: DeclId) -> Option<&TypedefDecl> {
        self.typedefs.get(id.as_ref())
    }

    pub fn get_class(&self, id: DeclId) -> Option<&ClassDecl> {
        self.classes.get(id.as_ref())
    }

    pub fn get_objc_protocol(&self, id: DeclId) -> Option<&ObjCProtocolDecl> {
        self.objc_protocols.get(id.as_ref())
    }

    pub fn get_objc_class(&self, id: DeclId) -> Option<&ObjCClassDecl> {
        self.objc_classes.get(id.as_ref())
    }

    /// Is there a typedef spelled `name`, other than one aliasing the record `except`?
    pub fn has_typedef_named(&self, name: &str, except: Option<DeclId>) -> bool {
        self.typedefs.iter().any(|td| {
            td.name == name
                && !matches!(
                    (&td.aliased.type_ref, except),
                    (TypeRef::Record { id }, Some(except)) if *id == except
                )
        })
    }

    /// `qual_type` with the typedefs it names looked through. Stops at a typedef that is missing or cyclic.
    pub fn canonical_type<'s>(&'s self, qual_type: &'s QualType) -> &'s QualType {
        let mut current = qual_type;
        let mut seen = Vec::new();
        while let TypeRef::Typedef { id } = &current.type_ref {
            if seen.contains(id) {
                break;
            }
            seen.push(*id);
            match self.get_typedef(*id) {
                Some(td) => current = &td.aliased,
                None => break,
            }
        }
        current
    }

    /// Find the function called `name`, suggesting near misses when there is none
    pub fn find_function(&self, name: &str) -> Result<&FunctionDecl> {
        let matches: Vec<&FunctionDecl> =
            self.functions.iter().filter(|f| f.name == name).collect();

        match matches.len() {
            0 => {
                let suggestions =
                    suggest_names(name, self.functions.iter().map(|f| f.name.as_str()));
                error!("Could not find function matching name: \"{}\"", name);
                if !suggestions.is_empty() {
                    error!("Did you mean one of:");
                    for sug in suggestions {
                        error!("  {sug}");
                    }
                }
                Err(Error::FunctionNotFound(name.to_string()))
            }
            1 => Ok(matches[0]),
            _ => {
                error!("Multiple matches found for function \"{name}\":");
                for m in matches {
                    error!("  {}", m.id);
                }
                Err(Error::MultipleMatches(name.to_string()))
            }
        }
    }
}

/// The (up to) three candidates closest to `name` by edit distance
pub fn suggest_names<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut distances: Vec<(usize, &str)> = candidates
        .map(|c| (levenshtein::levenshtein(c, name), c))
        .collect();
    distances.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(b.1)));
    distances.into_iter().take(3).map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn read_index_from_json() -> Result<(), Error> {
        let index = DeclarationIndex::from_json_str(indoc!(
            r##"
            {
                "preamble": ["#include <stdio.h>"],
                "functions": [
                    {
                        "id": "c:@F@printf",
                        "name": "printf",
                        "result": { "spelling": "int", "type_ref": { "kind": "integer", "size": 4, "is_signed": true } },
                        "parameters": [
                            {
                                "name": "format",
                                "qual_type": {
                                    "spelling": "const char *",
                                    "type_ref": {
                                        "kind": "pointer",
                                        "pointee": {
                                            "spelling": "const char",
                                            "is_const": true,
                                            "type_ref": { "kind": "char", "size": 1, "is_signed": true }
                                        }
                                    }
                                }
                            }
                        ],
                        "is_variadic": true
                    }
                ],
                "structs": [
                    { "id": "c:@S@Point", "name": "Point", "def": { "size": 8, "align": 4 } },
                    { "id": "c:@S@Opaque", "name": "Opaque" }
                ],
                "typedefs": [
                    { "id": "c:@T@Point", "name": "Point", "aliased": { "spelling": "struct Point", "type_ref": { "kind": "record", "id": "c:@S@Point" } } }
                ],
                "macro_constants": [
                    { "name": "VERSION", "qual_type": { "spelling": "int", "type_ref": { "kind": "integer", "size": 4, "is_signed": true } }, "value": { "integer": 3 } }
                ]
            }
            "##
        ))?;

        assert_eq!(index.preamble(), &["#include <stdio.h>".to_string()]);
        assert_eq!(index.functions().len(), 1);
        assert_eq!(index.structs().len(), 2);

        let printf = index.find_function("printf")?;
        assert!(printf.is_variadic);
        assert_eq!(printf.parameters[0].qual_type.spelling, "const char *");
        assert!(matches!(
            printf.parameters[0].qual_type.pointee().map(|p| &p.type_ref),
            Some(TypeRef::Char { size: 1, .. })
        ));

        let opaque = index
            .get_struct(DeclId::new("c:@S@Opaque"))
            .ok_or(Error::StructNotFound(DeclId::new("c:@S@Opaque")))?;
        assert!(opaque.is_forward());

        // a typedef aliasing its own struct does not count as a name clash
        assert!(!index.has_typedef_named("Point", Some(DeclId::new("c:@S@Point"))));
        assert!(index.has_typedef_named("Point", None));

        Ok(())
    }

    #[test]
    fn canonical_type_looks_through_typedefs() {
        let mut index = DeclarationIndex::new();
        let point = QualType::record("struct P", DeclId::new("c:@S@P"));
        index.insert_typedef(TypedefDecl {
            id: DeclId::new("c:@T@PT"),
            name: "PT".to_string(),
            aliased: point.clone(),
        });
        index.insert_typedef(TypedefDecl {
            id: DeclId::new("c:@T@Loop"),
            name: "Loop".to_string(),
            aliased: QualType::new(
                "Loop",
                false,
                TypeRef::Typedef {
                    id: DeclId::new("c:@T@Loop"),
                },
            ),
        });

        let pt = QualType::new(
            "PT",
            false,
            TypeRef::Typedef {
                id: DeclId::new("c:@T@PT"),
            },
        );
        assert_eq!(index.canonical_type(&pt), &point);
        assert_eq!(index.canonical_type(&point), &point);

        let looped = QualType::new(
            "Loop",
            false,
            TypeRef::Typedef {
                id: DeclId::new("c:@T@Loop"),
            },
        );
        assert_eq!(index.canonical_type(&looped).spelling, "Loop");
    }

    #[test]
    fn find_function_reports_missing() {
        let mut index = DeclarationIndex::new();
        index.insert_function(FunctionDecl::new("draw_line", QualType::void(), vec![]));
        index.insert_function(FunctionDecl::new("draw_circle", QualType::void(), vec![]));

        assert!(matches!(
            index.find_function("draw_lines"),
            Err(Error::FunctionNotFound(_))
        ));
        assert_eq!(
            suggest_names("draw_lines", index.functions().iter().map(|f| f.name.as_str()))[0],
            "draw_line"
        );
    }
}
