use std::cell::RefCell;

use stexpr::{
    value, Context, Engine, ErrorKind, ExecutionMode, LinkParameter, Value, ValueContext,
};

const NORMAL: ExecutionMode = ExecutionMode::Normal;

#[test]
fn context_from_serialize() {
    #[derive(serde::Serialize)]
    struct Root {
        user: User,
        scores: Vec<f64>,
    }

    #[derive(serde::Serialize)]
    struct User {
        name: String,
        age: u32,
        admin: bool,
        nickname: Option<String>,
    }

    let root = Root {
        user: User {
            name: "John Smith".into(),
            age: 42,
            admin: true,
            nickname: None,
        },
        scores: vec![1.5, 2.25],
    };
    let ctx = ValueContext::from_serialize(&root).unwrap();
    let engine = Engine::new();

    let result = engine.eval("${user.name}", &ctx, NORMAL).unwrap();
    assert_eq!(result, Value::from("John Smith"));
    let result = engine.eval("${user.age} >= 18 and ${user.admin}", &ctx, NORMAL).unwrap();
    assert_eq!(result, Value::Bool(true));
    let result = engine.eval("${user.nickname} ?: 'none'", &ctx, NORMAL).unwrap();
    assert_eq!(result, Value::from("none"));
    let result = engine.eval("${scores[0]} + ${scores[1]}", &ctx, NORMAL).unwrap();
    assert_eq!(result, Value::from(3.75));
}

#[test]
fn context_selection() {
    let ctx = ValueContext::new(value!({ name: "root" }));
    let result = Engine::new().eval("*{name}", &ctx, NORMAL).unwrap();
    assert_eq!(result, Value::from("root"));

    let ctx = ctx.with_selection(value!({ name: "selected" }));
    let engine = Engine::new();
    assert_eq!(
        engine.eval("*{name}", &ctx, NORMAL).unwrap(),
        Value::from("selected")
    );
    assert_eq!(
        engine.eval("${name}", &ctx, NORMAL).unwrap(),
        Value::from("root")
    );
}

#[test]
fn context_custom_impl() {
    struct Upper;

    impl Context for Upper {
        fn resolve_variable(&self, expression: &str) -> Option<Value> {
            Some(Value::from(expression.to_uppercase()))
        }
    }

    let result = Engine::new()
        .eval("${abc} + *{def}", &Upper, NORMAL)
        .unwrap();
    assert_eq!(result, Value::from("ABCDEF"));
}

#[test]
fn context_trait_object() {
    let ctx = ValueContext::new(value!({ a: 1 }));
    let ctx: &dyn Context = &ctx;
    let result = Engine::new().eval("${a} + 1", ctx, NORMAL).unwrap();
    assert_eq!(result, Value::from(2));
}

#[test]
fn context_messages() {
    let ctx = ValueContext::new(value!({ user: { name: "John" }, key: "bye" })).with_messages(
        |key: &str, args: &[Value]| match key {
            "home.welcome" => Some(format!("Welcome, {}!", args[0])),
            "bye" => Some(String::from("Goodbye")),
            _ => None,
        },
    );
    let engine = Engine::new();
    assert_eq!(
        engine
            .eval("#{home.welcome(${user.name})}", &ctx, NORMAL)
            .unwrap(),
        Value::from("Welcome, John!")
    );
    assert_eq!(
        engine.eval("#{${key}}", &ctx, NORMAL).unwrap(),
        Value::from("Goodbye")
    );
    assert_eq!(
        engine.eval("#{unknown}", &ctx, NORMAL).unwrap(),
        Value::None
    );
    assert_eq!(
        engine.eval("#{unknown} ?: 'fallback'", &ctx, NORMAL).unwrap(),
        Value::from("fallback")
    );
}

#[test]
fn context_messages_args() {
    let seen = RefCell::new(Vec::new());
    let ctx = ValueContext::new(value!({ n: 3 })).with_messages(|key: &str, args: &[Value]| {
        seen.borrow_mut().push((key.to_owned(), args.to_vec()));
        Some(String::new())
    });
    Engine::new()
        .eval("#{items.count(${n}, 'x', ${n} * 2)}", &ctx, NORMAL)
        .unwrap();
    assert_eq!(
        *seen.borrow(),
        [(
            String::from("items.count"),
            vec![Value::from(3), Value::from("x"), Value::from(6)]
        )]
    );
}

#[test]
fn context_messages_err_key() {
    let ctx = ValueContext::new(value!({ blank: "  " }))
        .with_messages(|_: &str, _: &[Value]| Some(String::new()));
    let engine = Engine::new();
    for input in ["#{${missing}}", "#{${blank}}"] {
        let err = engine.eval(input, &ctx, NORMAL).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Evaluation);
        assert_eq!(
            err.to_string(),
            "message key must be a non-null and non-empty string"
        );
    }
}

#[test]
fn context_links() {
    let ctx = ValueContext::new(value!({ order: { id: 7 } })).with_links(
        |base: &str, params: &[LinkParameter]| {
            let query: Vec<String> = params
                .iter()
                .map(|p| match &p.value {
                    Some(value) => format!("{}={}", p.name, value),
                    None => p.name.clone(),
                })
                .collect();
            Some(format!("{}?{}", base, query.join("&")))
        },
    );
    let result = Engine::new()
        .eval("@{/order/details(id=${order.id}, flag)}", &ctx, NORMAL)
        .unwrap();
    assert_eq!(result, Value::from("/order/details?id=7&flag"));
}

#[test]
fn context_fragments() {
    let ctx = ValueContext::new(value!({ a: "x" })).with_fragments(
        |template: Option<&str>, selector: Option<&str>, params: &[(String, Value)]| {
            let params: Vec<String> = params.iter().map(|(k, v)| format!("{k}:{v}")).collect();
            Some(Value::from(format!(
                "{}::{}({})",
                template.unwrap_or("<current>"),
                selector.unwrap_or("<all>"),
                params.join(",")
            )))
        },
    );
    let engine = Engine::new();
    assert_eq!(
        engine.eval("~{footer :: copy}", &ctx, NORMAL).unwrap(),
        Value::from("footer::copy()")
    );
    assert_eq!(
        engine
            .eval("~{this :: copy(${a}, y=1)}", &ctx, NORMAL)
            .unwrap(),
        Value::from("<current>::copy(_arg0:x,y:1)")
    );
    assert_eq!(
        engine.eval("~{:: copy}", &ctx, NORMAL).unwrap(),
        Value::from("<current>::copy()")
    );
    assert_eq!(
        engine.eval("~{footer}", &ctx, NORMAL).unwrap(),
        Value::from("footer::<all>()")
    );
}

#[test]
fn context_unsupported() {
    let ctx = ValueContext::new(value!({}));
    let engine = Engine::new();
    for input in ["#{welcome}", "@{/home}", "~{footer :: copy}"] {
        let err = engine.eval(input, &ctx, NORMAL).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedContext, "{input}");
    }
    // Unused branches never touch the missing capability.
    let result = engine.eval("true ? 1 : #{welcome}", &ctx, NORMAL).unwrap();
    assert_eq!(result, Value::from(1));
}

#[test]
fn context_restricted_default_variables() {
    let ctx = ValueContext::new(value!({ param: { id: 1 }, params: 2 }));
    let engine = Engine::new();

    let result = engine.eval("${param.id}", &ctx, NORMAL).unwrap();
    assert_eq!(result, Value::from(1));

    for mode in [ExecutionMode::Restricted, ExecutionMode::Unescaped] {
        let err = engine.eval("${param.id}", &ctx, mode).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Evaluation);
        assert_eq!(
            err.to_string(),
            format!(r#"access to variable "param" is forbidden in {mode} mode"#)
        );
        let err = engine.eval("*{param}", &ctx, mode).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Evaluation);
        let result = engine.eval("${params}", &ctx, mode).unwrap();
        assert_eq!(result, Value::from(2));
    }
}

#[test]
fn context_restricted_added_variable() {
    let ctx = ValueContext::new(value!({ secrets: { key: "hunter2" } }));
    let mut engine = Engine::new();
    engine.add_restricted_variable("secrets");

    let err = engine
        .eval("${secrets.key}", &ctx, ExecutionMode::Restricted)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"access to variable "secrets" is forbidden in restricted mode"#
    );
    let result = engine.eval("${secrets.key}", &ctx, NORMAL).unwrap();
    assert_eq!(result, Value::from("hunter2"));
}

#[test]
fn context_restricted_free_function() {
    let ctx = ValueContext::new(value!({ param: 1 }));
    let expr = stexpr::parse("${param}").unwrap();
    let err = stexpr::evaluate(&expr, &ctx, ExecutionMode::Restricted).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Evaluation);
}

#[test]
fn context_to_value() {
    #[derive(serde::Serialize)]
    enum Status {
        Active,
        Banned { reason: String },
    }

    let value = stexpr::to_value([Status::Active, Status::Banned { reason: "spam".into() }]).unwrap();
    let ctx = ValueContext::new(value!({ statuses: value }));
    let engine = Engine::new();
    assert_eq!(
        engine.eval("${statuses[0]} == 'Active'", &ctx, NORMAL).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        engine
            .eval("${statuses[1].Banned.reason}", &ctx, NORMAL)
            .unwrap(),
        Value::from("spam")
    );
}
