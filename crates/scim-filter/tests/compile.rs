//! End-to-end tests of leaf compilation, execution and rendering.

use scim_filter::{
    render, Compiler, FieldRef, FieldRegistry, FilterConfig, FilterError, FilterQuery, Literal,
    Op, QueryContext, Relation, ResourceKind, SubResource, User, ValueType,
};

fn registry() -> FieldRegistry {
    FieldRegistry::default()
}

fn compile_user(
    registry: &FieldRegistry,
    path: &str,
    op: Op,
    literal: Option<&str>,
) -> Result<scim_filter::Predicate, FilterError> {
    let mut ctx = QueryContext::new(ResourceKind::User);
    Compiler::new(registry).compile(&mut ctx, path, op, literal)
}

/// A literal that coerces for the given type under the default codes.
fn valid_literal(value_type: ValueType) -> &'static str {
    match value_type {
        ValueType::String => "abc",
        ValueType::Boolean => "true",
        ValueType::Timestamp => "2020-01-01T00:00:00Z",
        ValueType::Code(Relation::Emails) => "work",
        ValueType::Code(Relation::PhoneNumbers) => "mobile",
        ValueType::Code(Relation::Ims) => "xmpp",
        ValueType::Code(Relation::Photos) => "photo",
        ValueType::Code(Relation::Members) => "",
    }
}

// ============================================================================
// Registry coverage
// ============================================================================

#[test]
fn every_registered_path_compiles_with_eq() {
    let registry = registry();
    let compiler = Compiler::new(&registry);
    for kind in [ResourceKind::User, ResourceKind::Group] {
        for field in registry.fields(kind) {
            let mut ctx = QueryContext::new(kind);
            let literal = valid_literal(field.value_type);
            let predicate = compiler
                .compile(&mut ctx, field.path, Op::Eq, Some(literal))
                .unwrap_or_else(|e| panic!("{} {}: {}", kind, field.path, e));
            assert_eq!(predicate.op(), Op::Eq);
            assert_eq!(predicate.value_type(), field.value_type);
        }
    }
}

#[test]
fn every_registered_path_compiles_with_present() {
    let registry = registry();
    let compiler = Compiler::new(&registry);
    for field in registry.fields(ResourceKind::User) {
        let mut ctx = QueryContext::new(ResourceKind::User);
        let predicate = compiler
            .compile(&mut ctx, field.path, Op::Present, None)
            .unwrap();
        assert!(predicate.literal().is_none());
    }
}

#[test]
fn unregistered_paths_are_unsupported() {
    let registry = registry();
    for path in ["password", "userName", "EMAILS", "emails.display", "x509certificates", ""] {
        let err = compile_user(&registry, path, Op::Eq, Some("x")).unwrap_err();
        assert_eq!(
            err,
            FilterError::UnsupportedFilterField {
                kind: ResourceKind::User,
                path: path.to_string()
            }
        );
    }
}

// ============================================================================
// Join sharing
// ============================================================================

#[test]
fn sibling_fields_share_one_join() {
    let registry = registry();
    let compiler = Compiler::new(&registry);
    let mut ctx = QueryContext::new(ResourceKind::User);

    let value = compiler
        .compile(&mut ctx, "emails.value", Op::Eq, Some("a@b.com"))
        .unwrap();
    let kind = compiler
        .compile(&mut ctx, "emails.type", Op::Eq, Some("work"))
        .unwrap();

    let handle = |field: &FieldRef| match *field {
        FieldRef::Joined { join, .. } => join,
        other => panic!("expected joined field, got {:?}", other),
    };
    assert_eq!(handle(value.field()), handle(kind.field()));
    assert_eq!(ctx.joins().len(), 1);
}

#[test]
fn bare_and_explicit_value_share_one_join() {
    let registry = registry();
    let compiler = Compiler::new(&registry);
    let mut ctx = QueryContext::new(ResourceKind::User);

    let bare = compiler.compile(&mut ctx, "ims", Op::Eq, Some("a")).unwrap();
    let explicit = compiler
        .compile(&mut ctx, "ims.value", Op::Eq, Some("a"))
        .unwrap();
    assert_eq!(bare, explicit);
    assert_eq!(ctx.joins().len(), 1);
}

#[test]
fn distinct_relations_never_share_a_join() {
    let registry = registry();
    let compiler = Compiler::new(&registry);
    let mut ctx = QueryContext::new(ResourceKind::User);

    for path in ["emails", "phonenumbers", "ims", "photos"] {
        compiler.compile(&mut ctx, path, Op::Present, None).unwrap();
    }
    let aliases: Vec<_> = ctx.joins().iter().map(|j| j.alias).collect();
    assert_eq!(aliases, ["emails", "phonenumbers", "ims", "photos"]);
}

#[test]
fn root_and_embedded_fields_add_no_joins() {
    let registry = registry();
    let compiler = Compiler::new(&registry);
    let mut ctx = QueryContext::new(ResourceKind::User);

    for (path, literal) in [
        ("username", "bjensen"),
        ("name.givenname", "Barbara"),
        ("meta.location", "https://example.com/Users/1"),
    ] {
        compiler
            .compile(&mut ctx, path, Op::Eq, Some(literal))
            .unwrap();
    }
    assert!(ctx.joins().is_empty());
}

// ============================================================================
// Literal coercion
// ============================================================================

#[test]
fn timestamps() {
    let registry = registry();
    for literal in [
        "2020-01-01T00:00:00Z",
        "2020-01-01T10:00Z",
        "2020-01-01T00:00:00+0100",
        "2020-01-01T00:00:00.250-05:00",
        "2020-01-01T10:00",
        "2020-01-01",
    ] {
        let p = compile_user(&registry, "meta.created", Op::Gt, Some(literal));
        assert!(matches!(p.unwrap().literal(), Some(Literal::Timestamp(_))), "{}", literal);
    }

    let err = compile_user(&registry, "meta.created", Op::Gt, Some("not-a-date")).unwrap_err();
    assert_eq!(
        err,
        FilterError::InvalidLiteralForType {
            path: "meta.created".into(),
            expected: "timestamp",
            literal: "not-a-date".into()
        }
    );
}

#[test]
fn email_type_codes() {
    let registry = registry();
    assert!(compile_user(&registry, "emails.type", Op::Eq, Some("work")).is_ok());

    let err = compile_user(&registry, "emails.type", Op::Eq, Some("bogus")).unwrap_err();
    assert!(matches!(err, FilterError::InvalidLiteralForType { .. }));

    for literal in [None, Some(""), Some("bogus")] {
        assert!(compile_user(&registry, "emails.type", Op::Present, literal).is_ok());
    }
}

#[test]
fn booleans() {
    let registry = registry();
    for raw in ["true", "TRUE"] {
        let p = compile_user(&registry, "active", Op::Eq, Some(raw)).unwrap();
        assert_eq!(p.literal(), Some(&Literal::Bool(true)));
    }
    let err = compile_user(&registry, "active", Op::Eq, Some("maybe")).unwrap_err();
    assert!(matches!(err, FilterError::InvalidLiteralForType { .. }));
}

#[test]
fn operator_table() {
    let registry = registry();
    let rejected = [
        ("active", Op::Gt, "true"),
        ("active", Op::Contains, "t"),
        ("meta.created", Op::StartsWith, "2020"),
        ("emails.type", Op::Lt, "work"),
    ];
    for (path, op, literal) in rejected {
        let err = compile_user(&registry, path, op, Some(literal)).unwrap_err();
        assert!(
            matches!(err, FilterError::UnsupportedOperator { .. }),
            "{} {}",
            path,
            op
        );
    }

    for op in [Op::Eq, Op::Contains, Op::StartsWith, Op::Gt, Op::Gte, Op::Lt, Op::Lte] {
        assert!(compile_user(&registry, "displayname", op, Some("B")).is_ok());
    }
}

#[test]
fn configured_codes_replace_defaults() {
    let config = FilterConfig::from_yaml_str("type_codes:\n  ims: [matrix]\n").unwrap();
    let registry = FieldRegistry::from_config(&config).unwrap();
    assert!(compile_user(&registry, "ims.type", Op::Eq, Some("matrix")).is_ok());
    assert!(compile_user(&registry, "ims.type", Op::Eq, Some("xmpp")).is_err());
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn independent_contexts_compile_equal_predicates() {
    let registry = registry();
    let compiler = Compiler::new(&registry);

    let compile_in_fresh_context = || {
        let mut ctx = QueryContext::new(ResourceKind::User);
        compiler.compile(&mut ctx, "emails.type", Op::Eq, Some("home")).unwrap()
    };

    let first = compile_in_fresh_context();
    let second = compile_in_fresh_context();
    assert_eq!(first, second);
}

// ============================================================================
// Execution and rendering
// ============================================================================

#[test]
fn query_executes_and_renders_consistently() {
    let registry = registry();
    let compiler = Compiler::new(&registry);

    let mut jensen = User::new("u1", "bjensen");
    jensen.active = Some(true);
    jensen.set_emails(vec![
        SubResource::new("bjensen@example.com").with_kind("work").with_primary(true),
        SubResource::new("babs@jensen.org").with_kind("home"),
    ]);
    let mut smith = User::new("u2", "jsmith");
    smith.active = Some(true);
    smith.set_emails(vec![SubResource::new("jsmith@example.com").with_kind("home")]);
    let users = vec![jensen, smith];

    let query = FilterQuery::new(ResourceKind::User)
        .and(&compiler, "active", Op::Eq, Some("True"))
        .unwrap()
        .and(&compiler, "emails.primary", Op::Eq, Some("true"))
        .unwrap()
        .and(&compiler, "emails", Op::Contains, Some("example.com"))
        .unwrap();

    let matched: Vec<_> = query.filter(&users).iter().map(|u| u.user_name.as_str()).collect();
    assert_eq!(matched, ["bjensen"]);

    let stmt = render(&query);
    assert_eq!(stmt.text.matches("LEFT OUTER JOIN").count(), 1);
    assert!(stmt.text.ends_with(
        "WHERE u.active = $1 AND emails.is_primary = $2 AND emails.value LIKE $3 ESCAPE '\\'"
    ));
}

// ============================================================================
// Concurrency
// ============================================================================

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn registry_and_compiler_are_send_and_sync() {
    assert_send_sync::<FieldRegistry>();
    assert_send_sync::<Compiler<'static>>();
    assert_send_sync::<FilterQuery>();
}

#[test]
fn threads_compile_against_the_global_registry() {
    let leaves = [
        ("emails.type", Op::Eq, Some("work")),
        ("emails.value", Op::Contains, Some("@example.com")),
        ("meta.created", Op::Gt, Some("2020-01-01T00:00:00Z")),
        ("phonenumbers", Op::Present, None),
        ("active", Op::Eq, Some("true")),
    ];

    // Each call owns its context; only the registry is shared
    let compile_all = || {
        let compiler = Compiler::default();
        assert!(std::ptr::eq(compiler.registry(), scim_filter::registry::global()));

        let mut ctx = QueryContext::new(ResourceKind::User);
        let predicates: Vec<_> = leaves
            .iter()
            .map(|(path, op, literal)| compiler.compile(&mut ctx, path, *op, *literal).unwrap())
            .collect();
        (predicates, ctx.joins().to_vec())
    };

    let expected = compile_all();
    assert_eq!(expected.1.len(), 2);

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8).map(|_| scope.spawn(&compile_all)).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(results.len(), 8);
    for result in results {
        assert_eq!(result, expected);
    }
}
