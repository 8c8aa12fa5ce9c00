use super::*;
use crate::ir::{
    BinaryOp, Binder, CatchBlock, ElementInit, GotoKind, HostObject, MAX_DELEGATE_PARAMETERS,
    Member, MemberBinding, MethodInfo, NamedType, SwitchCase, UnaryOp, Value,
};

fn param(ty: Type, name: &str) -> Parameter {
    Parameter::new(ty, name)
}

fn p(parameter: &Parameter) -> Expr {
    Expr::Parameter(parameter.clone())
}

fn snippet(node: &Expr) -> String {
    translate(node, &Definitions::new()).unwrap().script
}

fn method(parameters: Vec<Parameter>, body: Expr) -> String {
    snippet(&Expr::lambda(parameters, body))
}

mod methods {
    use super::*;

    #[test]
    fn entry_method_returns_its_body() {
        let x = param(Type::Int, "x");
        let y = param(Type::Int, "y");
        assert_eq!(
            method(vec![x.clone(), y.clone()], Expr::add(p(&x), p(&y))),
            "public int Main(int x, int y)\n{\n    return x + y;\n}"
        );
    }

    #[test]
    fn static_wrapper_class() {
        let x = param(Type::Int, "x");
        let y = param(Type::Int, "y");
        let defs = Definitions::new().with_type_name("Program").with_static(true);
        let node = Expr::lambda(vec![x.clone(), y.clone()], Expr::add(p(&x), p(&y)));
        assert_eq!(
            node.to_script(&defs).unwrap(),
            "public static class Program\n{\n    public static int Main(int x, int y)\n    {\n        return x + y;\n    }\n}"
        );
    }

    #[test]
    fn configured_method_name() {
        let defs = Definitions::new().with_method_name("Run");
        let node = Expr::lambda(Vec::new(), Expr::constant(1));
        assert_eq!(
            node.to_script(&defs).unwrap(),
            "public int Run()\n{\n    return 1;\n}"
        );
    }

    #[test]
    fn void_body_has_no_return() {
        let x = param(Type::Int, "x");
        let body = Expr::block(vec![Expr::assign(p(&x), Expr::constant(1)), Expr::empty()]);
        assert_eq!(
            method(vec![x.clone()], body),
            "public void Main(int x)\n{\n    x = 1;\n}"
        );
    }

    #[test]
    fn by_ref_parameters_are_marked() {
        let x = param(Type::by_ref(Type::Int), "x");
        let body = Expr::block(vec![Expr::assign(p(&x), Expr::constant(1)), Expr::empty()]);
        assert!(method(vec![x], body).starts_with("public void Main(ref int x)"));
    }

    #[test]
    fn anonymous_parameters_get_one_name_each() {
        let a = Parameter::anonymous(Type::Int);
        let b = Parameter::anonymous(Type::Int);
        let node = Expr::lambda(
            vec![a.clone(), b.clone()],
            Expr::add(Expr::add(p(&a), p(&b)), p(&a)),
        );
        let translation = translate(&node, &Definitions::new()).unwrap();
        assert_eq!(
            translation.script,
            "public int Main(int p1, int p2)\n{\n    return p1 + p2 + p1;\n}"
        );
        let Expr::Lambda(rewritten) = &translation.expression else {
            panic!("expected a lambda");
        };
        assert_eq!(rewritten.name(), Some("Main"));
        let names: Vec<_> = rewritten.parameters().iter().map(|p| p.name()).collect();
        assert_eq!(names, [Some("p1"), Some("p2")]);
    }

    #[test]
    fn reserved_parameter_names_are_escaped() {
        let class = param(Type::Int, "class");
        assert_eq!(
            method(vec![class.clone()], p(&class)),
            "public int Main(int @class)\n{\n    return @class;\n}"
        );
    }
}

mod expressions {
    use super::*;

    #[test]
    fn ternary_for_value_conditionals() {
        let x = param(Type::Int, "x");
        let body = Expr::ternary(
            Expr::greater_than(p(&x), Expr::constant(0)),
            Expr::constant(1),
            Expr::constant(-1),
        );
        assert_eq!(
            method(vec![x], body),
            "public int Main(int x)\n{\n    return x > 0 ? 1 : -1;\n}"
        );
    }

    #[test]
    fn parentheses_follow_precedence() {
        let a = param(Type::Int, "a");
        let b = param(Type::Int, "b");
        let c = param(Type::Int, "c");
        assert_eq!(
            snippet(&Expr::subtract(p(&a), Expr::subtract(p(&b), p(&c)))),
            "a - (b - c)"
        );
        assert_eq!(
            snippet(&Expr::subtract(Expr::subtract(p(&a), p(&b)), p(&c))),
            "a - b - c"
        );
        assert_eq!(
            snippet(&Expr::multiply(Expr::add(p(&a), p(&b)), p(&c))),
            "(a + b) * c"
        );
        assert_eq!(
            snippet(&Expr::add(p(&a), Expr::multiply(p(&b), p(&c)))),
            "a + b * c"
        );
    }

    #[test]
    fn power_uses_math_pow() {
        let a = param(Type::Double, "a");
        let node = Expr::binary(BinaryOp::Power, p(&a), Expr::constant(Value::Double(2.0)));
        let translation = translate(&node, &Definitions::new()).unwrap();
        assert_eq!(translation.script, "Math.Pow(a, 2d)");
        assert_eq!(translation.namespaces, ["System"]);
    }

    #[test]
    fn unary_forms() {
        let x = param(Type::Int, "x");
        let flag = param(Type::Bool, "flag");
        let items = param(Type::array(Type::Int), "items");
        let o = param(Type::Object, "o");
        assert_eq!(snippet(&Expr::negate(p(&x))), "-x");
        assert_eq!(snippet(&Expr::not(p(&flag))), "!flag");
        assert_eq!(snippet(&Expr::not(p(&x))), "~x");
        assert_eq!(snippet(&Expr::convert(p(&x), Type::Long)), "(long)x");
        assert_eq!(snippet(&Expr::type_as(p(&o), Type::String)), "o as string");
        assert_eq!(snippet(&Expr::array_length(p(&items))), "items.Length");
        assert_eq!(
            snippet(&Expr::unary_same(UnaryOp::Increment, p(&x))),
            "x + 1"
        );
        assert_eq!(
            snippet(&Expr::unary_same(UnaryOp::PostIncrementAssign, p(&x))),
            "x++"
        );
        assert_eq!(
            snippet(&Expr::negate(Expr::add(p(&x), Expr::constant(1)))),
            "-(x + 1)"
        );
    }

    #[test]
    fn type_tests() {
        let o = param(Type::Object, "o");
        let n = param(Type::Int, "n");
        assert_eq!(snippet(&Expr::type_is(p(&o), Type::String)), "o is string");
        assert_eq!(
            snippet(&Expr::type_equal(p(&o), Type::String)),
            "o?.GetType() == typeof(string)"
        );
        assert_eq!(
            snippet(&Expr::type_equal(p(&n), Type::Int)),
            "n.GetType() == typeof(int)"
        );
    }

    #[test]
    fn members_and_indexers() {
        let s = param(Type::String, "s");
        let items = param(Type::array(Type::Int), "items");
        let config = Type::named("App", "Config");
        assert_eq!(
            snippet(&Expr::member(
                Some(p(&s)),
                Member::property(Type::String, "Length", Type::Int)
            )),
            "s.Length"
        );
        assert_eq!(
            snippet(&Expr::member(
                None,
                Member::field(config, "Limit", Type::Int).into_static()
            )),
            "Config.Limit"
        );
        assert_eq!(
            snippet(&Expr::index(p(&items), None, vec![Expr::constant(0)])),
            "items[0]"
        );
        assert_eq!(
            snippet(&Expr::binary(BinaryOp::ArrayIndex, p(&items), Expr::constant(1))),
            "items[1]"
        );
    }

    #[test]
    fn named_indexers_keep_their_name() {
        let grid = Type::named("App", "Grid");
        let g = param(grid.clone(), "g");
        let cells = Member::property(grid, "Cells", Type::Int);
        assert_eq!(
            snippet(&Expr::index(p(&g), Some(cells), vec![Expr::constant(0)])),
            "g.Cells[0]"
        );
    }

    #[test]
    fn construction() {
        let builder = Type::named("System.Text", "StringBuilder");
        assert_eq!(snippet(&Expr::new(builder, Vec::new())), "new StringBuilder()");
        assert_eq!(
            snippet(&Expr::new_array_init(
                Type::Int,
                vec![Expr::constant(1), Expr::constant(2), Expr::constant(3)]
            )),
            "new int[] {1, 2, 3}"
        );
        assert_eq!(
            snippet(&Expr::new_array_bounds(
                Type::Int,
                vec![Expr::constant(2), Expr::constant(3)]
            )),
            "new int[2, 3]"
        );
        assert_eq!(
            snippet(&Expr::new_array_bounds(
                Type::array(Type::Int),
                vec![Expr::constant(4)]
            )),
            "new int[4][]"
        );
    }

    #[test]
    fn long_initializers_wrap() {
        let items: Vec<Expr> = (1..=5).map(Expr::constant).collect();
        assert_eq!(
            snippet(&Expr::new_array_init(Type::Int, items)),
            "new int[]\n{\n    1,\n    2,\n    3,\n    4,\n    5\n}"
        );
    }

    #[test]
    fn member_bindings_wrap_when_several() {
        let point = Type::named("App", "Point");
        let Expr::New(new) = Expr::new(point.clone(), Vec::new()) else {
            panic!("expected a constructor call");
        };
        let x = Member::field(point.clone(), "X", Type::Int);
        let y = Member::field(point, "Y", Type::Int);
        let init = Expr::member_init(
            new.clone(),
            vec![
                MemberBinding::Assignment {
                    member: x.clone(),
                    expression: Expr::constant(1),
                },
                MemberBinding::Assignment {
                    member: y,
                    expression: Expr::constant(2),
                },
            ],
        );
        assert_eq!(
            snippet(&init),
            "new Point()\n{\n    X = 1,\n    Y = 2\n}"
        );
        let single = Expr::member_init(
            new,
            vec![MemberBinding::Assignment {
                member: x,
                expression: Expr::constant(1),
            }],
        );
        assert_eq!(snippet(&single), "new Point() {X = 1}");
    }

    #[test]
    fn list_initializers() {
        let list = NamedType::new(Some("System.Collections.Generic"), "List`1")
            .generic(vec![Type::Int])
            .into_type();
        let Expr::New(new) = Expr::new(list, Vec::new()) else {
            panic!("expected a constructor call");
        };
        let init = Expr::list_init(
            new,
            vec![
                ElementInit {
                    arguments: vec![Expr::constant(1)],
                },
                ElementInit {
                    arguments: vec![Expr::constant(2)],
                },
            ],
        );
        assert_eq!(snippet(&init), "new List<int>() {1, 2}");
    }

    #[test]
    fn block_in_expression_position_becomes_a_closure() {
        let node = Expr::add(Expr::constant(1), Expr::block(vec![Expr::constant(2)]));
        assert_eq!(
            snippet(&node),
            "1 + (new Func<int>(() => {\n    return 2;\n}))()"
        );
    }

    #[test]
    fn extension_nodes_are_rejected() {
        let err = translate(&Expr::extension("Custom", Type::Int), &Definitions::new()).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::UnsupportedNode {
                kind: NodeKind::Extension
            }
        ));
    }
}

mod literals {
    use super::*;

    fn literal(value: Value) -> String {
        snippet(&Expr::constant(value))
    }

    #[test]
    fn numbers() {
        assert_eq!(literal(Value::Int(42)), "42");
        assert_eq!(literal(Value::Long(5)), "5L");
        assert_eq!(literal(Value::UInt(5)), "5u");
        assert_eq!(literal(Value::ULong(5)), "5UL");
        assert_eq!(literal(Value::Short(5)), "(short)5");
        assert_eq!(literal(Value::Byte(7)), "(byte)7");
        assert_eq!(literal(Value::Double(1.5)), "1.5d");
        assert_eq!(literal(Value::Float(1.5)), "1.5f");
        assert_eq!(literal(Value::Decimal("12.50".into())), "12.50m");
    }

    #[test]
    fn special_floats() {
        assert_eq!(literal(Value::Double(f64::NAN)), "double.NaN");
        assert_eq!(literal(Value::Double(f64::INFINITY)), "double.PositiveInfinity");
        assert_eq!(literal(Value::Float(f32::NEG_INFINITY)), "float.NegativeInfinity");
    }

    #[test]
    fn strings_and_chars() {
        assert_eq!(literal(Value::String("hello".into())), "\"hello\"");
        assert_eq!(literal(Value::String(r"C:\dir".into())), r#"@"C:\dir""#);
        assert_eq!(
            literal(Value::String("say \"hi\"".into())),
            r#"@"say ""hi""""#
        );
        assert_eq!(literal(Value::String("a\nb".into())), "@\"a\nb\"");
        assert_eq!(literal(Value::Char('a')), "'a'");
        assert_eq!(literal(Value::Char('\'')), r"'\''");
        assert_eq!(literal(Value::Char('\\')), r"'\\'");
        assert_eq!(literal(Value::Char('\n')), r"'\n'");
    }

    #[test]
    fn keywords_types_and_enums() {
        let day = Type::named("System", "DayOfWeek");
        assert_eq!(literal(Value::Null), "null");
        assert_eq!(literal(Value::Bool(true)), "true");
        assert_eq!(literal(Value::Type(Type::String)), "typeof(string)");
        assert_eq!(
            literal(Value::Enum {
                ty: day.clone(),
                member: Some("Monday".into()),
                raw: 1,
            }),
            "DayOfWeek.Monday"
        );
        assert_eq!(
            literal(Value::Enum {
                ty: day,
                member: None,
                raw: 9,
            }),
            "(DayOfWeek)9"
        );
    }

    #[test]
    fn negative_unnamed_enum_values_are_parenthesised() {
        let color = Type::named("App", "Color");
        assert_eq!(
            literal(Value::Enum {
                ty: color,
                member: None,
                raw: -1,
            }),
            "(Color)(-1)"
        );
        assert_eq!(literal(Value::Short(-5)), "(short)-5");
    }

    #[test]
    fn objects_hoist_once() {
        let settings = HostObject::new(Type::named("App", "Settings"), 42_u32);
        let constant = Expr::constant(Value::Object(settings.clone()));
        let node = Expr::lambda(Vec::new(), Expr::equal(constant.clone(), constant));
        let translation = translate(&node, &Definitions::new()).unwrap();
        assert_eq!(
            translation.script,
            "public bool Main()\n{\n    return Settings1 == Settings1;\n}"
        );
        assert_eq!(translation.fields.len(), 1);
        let Some(HoistedValue::Object(hoisted)) = translation.hoisted_value("Settings1") else {
            panic!("expected a hoisted object");
        };
        assert!(hoisted.ptr_eq(&settings));
        assert_eq!(hoisted.downcast_ref::<u32>(), Some(&42));
    }

    #[test]
    fn distinct_objects_get_distinct_fields() {
        let ty = Type::named("App", "Settings");
        let a = Expr::constant(Value::Object(HostObject::new(ty.clone(), 1_u8)));
        let b = Expr::constant(Value::Object(HostObject::new(ty, 1_u8)));
        assert_eq!(snippet(&Expr::equal(a, b)), "Settings1 == Settings2");
    }
}

mod calls {
    use super::*;

    #[test]
    fn static_and_instance_calls() {
        let x = param(Type::Int, "x");
        let y = param(Type::Int, "y");
        let s = param(Type::String, "s");
        let max = MethodInfo::new(Type::math(), "Max", Type::Int)
            .param("a", Type::Int)
            .param("b", Type::Int)
            .build();
        let trim = MethodInfo::new(Type::String, "Trim", Type::String)
            .instance()
            .build();
        assert_eq!(
            snippet(&Expr::call_static(max, vec![p(&x), p(&y)])),
            "Math.Max(x, y)"
        );
        assert_eq!(snippet(&Expr::call(Some(p(&s)), trim, Vec::new())), "s.Trim()");
    }

    #[test]
    fn out_arguments_are_prefixed() {
        let s = param(Type::String, "s");
        let r = param(Type::Int, "r");
        let parse = MethodInfo::new(Type::Int, "TryParse", Type::Bool)
            .param("s", Type::String)
            .out_param("result", Type::Int)
            .build();
        assert_eq!(
            snippet(&Expr::call_static(parse, vec![p(&s), p(&r)])),
            "int.TryParse(s, out r)"
        );
    }

    #[test]
    fn generic_and_extension_calls() {
        let enumerable = Type::named("System.Linq", "Enumerable");
        let items = param(Type::array(Type::Int), "items");
        let empty = MethodInfo::new(enumerable.clone(), "Empty", Type::array(Type::Int))
            .generic(vec![Type::Int])
            .build();
        let count = MethodInfo::new(enumerable, "Count", Type::Int)
            .param("source", Type::array(Type::Int))
            .extension()
            .build();
        assert_eq!(
            snippet(&Expr::call_static(empty, Vec::new())),
            "Enumerable.Empty<int>()"
        );
        let translation =
            translate(&Expr::call_static(count, vec![p(&items)]), &Definitions::new()).unwrap();
        assert_eq!(translation.script, "items.Count()");
        assert_eq!(translation.namespaces, ["System.Linq"]);
    }

    #[test]
    fn default_indexer_getter_renders_as_indexer() {
        let list = NamedType::new(Some("System.Collections.Generic"), "List`1")
            .generic(vec![Type::Int])
            .default_member("Item")
            .into_type();
        let l = param(list.clone(), "list");
        let get_item = MethodInfo::new(list, "get_Item", Type::Int)
            .param("index", Type::Int)
            .instance()
            .special_name()
            .build();
        assert_eq!(
            snippet(&Expr::call(Some(p(&l)), get_item, vec![Expr::constant(0)])),
            "list[0]"
        );
    }

    #[test]
    fn non_public_methods_are_hoisted() {
        let x = param(Type::Int, "x");
        let compute = MethodInfo::new(Type::named("App", "Secrets"), "Compute", Type::Int)
            .param("a", Type::Int)
            .non_public()
            .build();
        let node = Expr::lambda(
            vec![x.clone()],
            Expr::add(
                Expr::call_static(compute.clone(), vec![p(&x)]),
                Expr::call_static(compute.clone(), vec![Expr::constant(1)]),
            ),
        );
        let defs = Definitions::new().with_type_name("Program");
        let translation = translate(&node, &defs).unwrap();
        assert_eq!(
            translation.script,
            "using System;\n\npublic class Program\n{\n    public Func<int, int> Compute1;\n\n    public int Main(int x)\n    {\n        return Compute1.Invoke(x) + Compute1.Invoke(1);\n    }\n}"
        );
        let Some(HoistedValue::Method(hoisted)) = translation.hoisted_value("Compute1") else {
            panic!("expected a hoisted method");
        };
        assert_eq!(*hoisted, compute);
    }

    #[test]
    fn non_public_methods_with_out_parameters_fail() {
        let parse = MethodInfo::new(Type::named("App", "Secrets"), "Parse", Type::Bool)
            .out_param("result", Type::Int)
            .non_public()
            .build();
        let err = translate(
            &Expr::call_static(parse, vec![Expr::constant(0)]),
            &Definitions::new(),
        )
        .unwrap_err();
        assert!(matches!(err, TranslateError::NonPublicMethod { method, .. } if method == "Parse"));
    }

    #[test]
    fn non_public_methods_with_too_many_parameters_fail() {
        let mut wide = MethodInfo::new(Type::named("App", "Secrets"), "Wide", Type::Int).non_public();
        for i in 0..=MAX_DELEGATE_PARAMETERS {
            wide = wide.param(format!("a{i}"), Type::Int);
        }
        let arguments = (0..=MAX_DELEGATE_PARAMETERS).map(|_| Expr::constant(0)).collect();
        let err = translate(&Expr::call_static(wide.build(), arguments), &Definitions::new())
            .unwrap_err();
        assert!(matches!(err, TranslateError::NonPublicMethod { .. }));
    }
}

mod statements {
    use super::*;

    #[test]
    fn unassigned_variables_are_declared_up_front() {
        let a = param(Type::Int, "a");
        let b = param(Type::Int, "b");
        let body = Expr::block_with_variables(
            vec![a.clone(), b.clone()],
            vec![
                Expr::assign(p(&a), Expr::constant(1)),
                Expr::add(p(&a), p(&b)),
            ],
        );
        assert_eq!(
            method(Vec::new(), body),
            "public int Main()\n{\n    int b;\n\n    int a = 1;\n    return a + b;\n}"
        );
    }

    #[test]
    fn if_else_chains() {
        let x = param(Type::Int, "x");
        let body = Expr::if_then_else(
            Expr::greater_than(p(&x), Expr::constant(0)),
            Expr::assign(p(&x), Expr::constant(1)),
            Expr::if_then_else(
                Expr::less_than(p(&x), Expr::constant(0)),
                Expr::assign(p(&x), Expr::constant(-1)),
                Expr::assign(p(&x), Expr::constant(0)),
            ),
        );
        assert_eq!(
            method(vec![x], body),
            "public void Main(int x)\n{\n    if (x > 0)\n    {\n        x = 1;\n    }\n    else if (x < 0)\n    {\n        x = -1;\n    }\n    else\n    {\n        x = 0;\n    }\n}"
        );
    }

    #[test]
    fn loop_with_exit_test_becomes_while() {
        let i = param(Type::Int, "i");
        let exit = LabelTarget::void();
        let body = Expr::if_then_else(
            Expr::less_than(p(&i), Expr::constant(10)),
            Expr::assign(p(&i), Expr::add(p(&i), Expr::constant(1))),
            Expr::break_to(exit.clone()),
        );
        let node = Expr::block(vec![
            Expr::loop_with_labels(body, Some(exit), None),
            p(&i),
        ]);
        assert_eq!(
            method(vec![i], node),
            "public int Main(int i)\n{\n    while (i < 10)\n    {\n        i = i + 1;\n    }\n    return i;\n}"
        );
    }

    #[test]
    fn break_out_of_nested_loop_uses_goto() {
        let exit = LabelTarget::new(Type::Void, "exit");
        let inner = Expr::infinite_loop(Expr::break_to(exit.clone()));
        let outer = Expr::loop_with_labels(inner, Some(exit), None);
        assert_eq!(
            method(Vec::new(), outer),
            "public void Main()\n{\n    while (true)\n    {\n        while (true)\n        {\n            goto exit;\n        }\n    }\n    exit:;\n}"
        );
    }

    #[test]
    fn labels_ending_a_body_get_an_empty_statement() {
        let done = LabelTarget::new(Type::Void, "done");
        let body = Expr::block(vec![
            Expr::goto_label(done.clone()),
            Expr::label(done, None),
        ]);
        assert_eq!(
            method(Vec::new(), body),
            "public void Main()\n{\n    goto done;\n    done:;\n}"
        );
    }

    #[test]
    fn goto_value_is_returned_through_the_label() {
        let x = param(Type::Int, "x");
        let end = LabelTarget::new(Type::Int, "end");
        let body = Expr::block(vec![
            Expr::if_then(
                Expr::greater_than(p(&x), Expr::constant(0)),
                Expr::jump(GotoKind::Goto, end.clone(), Some(p(&x))),
            ),
            Expr::label(end, Some(Expr::constant(0))),
        ]);
        assert_eq!(
            method(vec![x], body),
            "public int Main(int x)\n{\n    if (x > 0)\n    {\n        return x;\n    }\n    end:\n    return 0;\n}"
        );
    }

    #[test]
    fn goto_value_is_stored_before_jumping() {
        let x = param(Type::Int, "x");
        let end = LabelTarget::new(Type::Int, "end");
        let body = Expr::block(vec![
            Expr::if_then(
                Expr::greater_than(p(&x), Expr::constant(0)),
                Expr::jump(GotoKind::Goto, end.clone(), Some(p(&x))),
            ),
            Expr::label(end, Some(Expr::constant(0))),
        ]);
        let node = Expr::try_fault(body, Expr::assign(p(&x), Expr::constant(2)));
        assert_eq!(
            method(vec![x], node),
            "public int Main(int x)\n{\n    int result1;\n    bool fault1 = true;\n    try\n    {\n        if (x > 0)\n        {\n            result1 = x;\n            goto end;\n        }\n        result1 = 0;\n        end:;\n        fault1 = false;\n    }\n    finally\n    {\n        if (fault1)\n        {\n            x = 2;\n        }\n    }\n    return result1;\n}"
        );
    }

    #[test]
    fn typed_loop_returns_its_break_value() {
        let i = param(Type::Int, "i");
        let done = LabelTarget::new(Type::Int, "done");
        let node = Expr::loop_with_labels(
            Expr::jump(GotoKind::Break, done.clone(), Some(p(&i))),
            Some(done),
            None,
        );
        assert_eq!(
            method(vec![i], node),
            "public int Main(int i)\n{\n    while (true)\n    {\n        return i;\n    }\n}"
        );
    }

    #[test]
    fn typed_loop_stores_its_break_value() {
        let i = param(Type::Int, "i");
        let done = LabelTarget::new(Type::Int, "done");
        let body = Expr::block(vec![
            Expr::if_then(
                Expr::greater_than(p(&i), Expr::constant(10)),
                Expr::jump(GotoKind::Break, done.clone(), Some(p(&i))),
            ),
            Expr::assign(p(&i), Expr::add(p(&i), Expr::constant(1))),
        ]);
        let node = Expr::try_fault(
            Expr::loop_with_labels(body, Some(done), None),
            Expr::assign(p(&i), Expr::constant(0)),
        );
        assert_eq!(
            method(vec![i], node),
            "public int Main(int i)\n{\n    int result1;\n    bool fault1 = true;\n    try\n    {\n        while (true)\n        {\n            if (i > 10)\n            {\n                result1 = i;\n                break;\n            }\n            i = i + 1;\n        }\n        fault1 = false;\n    }\n    finally\n    {\n        if (fault1)\n        {\n            i = 0;\n        }\n    }\n    return result1;\n}"
        );
    }

    #[test]
    fn early_return_clears_the_fault_flag() {
        let x = param(Type::Int, "x");
        let body = Expr::block(vec![
            Expr::if_then(
                Expr::greater_than(p(&x), Expr::constant(0)),
                Expr::return_to(LabelTarget::void(), None),
            ),
            Expr::assign(p(&x), Expr::constant(1)),
            Expr::empty(),
        ]);
        let node = Expr::try_fault(body, Expr::assign(p(&x), Expr::constant(2)));
        assert_eq!(
            method(vec![x], node),
            "public void Main(int x)\n{\n    bool fault1 = true;\n    try\n    {\n        if (x > 0)\n        {\n            fault1 = false;\n            return;\n        }\n        x = 1;\n        fault1 = false;\n    }\n    finally\n    {\n        if (fault1)\n        {\n            x = 2;\n        }\n    }\n}"
        );
    }

    #[test]
    fn break_out_of_a_fault_try_clears_the_flag() {
        let i = param(Type::Int, "i");
        let exit = LabelTarget::void();
        let body = Expr::block(vec![
            Expr::if_then(
                Expr::greater_than(p(&i), Expr::constant(10)),
                Expr::break_to(exit.clone()),
            ),
            Expr::assign(p(&i), Expr::add(p(&i), Expr::constant(1))),
            Expr::empty(),
        ]);
        let node = Expr::loop_with_labels(
            Expr::try_fault(body, Expr::assign(p(&i), Expr::constant(0))),
            Some(exit),
            None,
        );
        assert_eq!(
            method(vec![i], node),
            "public void Main(int i)\n{\n    while (true)\n    {\n        bool fault1 = true;\n        try\n        {\n            if (i > 10)\n            {\n                fault1 = false;\n                break;\n            }\n            i = i + 1;\n            fault1 = false;\n        }\n        finally\n        {\n            if (fault1)\n            {\n                i = 0;\n            }\n        }\n    }\n}"
        );
    }

    #[test]
    fn switch_with_returning_cases() {
        let x = param(Type::Int, "x");
        let node = Expr::switch(
            p(&x),
            vec![
                SwitchCase {
                    test_values: vec![Expr::constant(1)],
                    body: Expr::constant("one"),
                },
                SwitchCase {
                    test_values: vec![Expr::constant(2), Expr::constant(3)],
                    body: Expr::constant("few"),
                },
            ],
            Some(Expr::constant("many")),
            Type::String,
        );
        assert_eq!(
            method(vec![x], node),
            "public string Main(int x)\n{\n    switch (x)\n    {\n        case 1:\n            return \"one\";\n        case 2:\n        case 3:\n            return \"few\";\n        default:\n            return \"many\";\n    }\n}"
        );
    }

    #[test]
    fn switch_statement_cases_break() {
        let x = param(Type::Int, "x");
        let node = Expr::switch(
            p(&x),
            vec![SwitchCase {
                test_values: vec![Expr::constant(1)],
                body: Expr::assign(p(&x), Expr::constant(0)),
            }],
            None,
            Type::Void,
        );
        assert_eq!(
            method(vec![x], node),
            "public void Main(int x)\n{\n    switch (x)\n    {\n        case 1:\n            x = 0;\n            break;\n    }\n}"
        );
    }

    #[test]
    fn try_catch_returns_from_each_branch() {
        let x = param(Type::Int, "x");
        let e = param(Type::exception(), "e");
        let node = Expr::try_catch(
            Expr::divide(Expr::constant(10), p(&x)),
            vec![CatchBlock::with_variable(e, Expr::constant(0))],
        );
        assert_eq!(
            method(vec![x], node),
            "public int Main(int x)\n{\n    try\n    {\n        return 10 / x;\n    }\n    catch (Exception e)\n    {\n        return 0;\n    }\n}"
        );
    }

    #[test]
    fn catch_filters() {
        let x = param(Type::Int, "x");
        let e = param(Type::exception(), "e");
        let filter = Expr::type_is(p(&e), Type::system("DivideByZeroException"));
        let node = Expr::try_catch(
            Expr::divide(Expr::constant(10), p(&x)),
            vec![CatchBlock::with_variable(e, Expr::constant(0)).when(filter)],
        );
        assert!(method(vec![x], node).contains("catch (Exception e) when (e is DivideByZeroException)"));
    }

    #[test]
    fn fault_handlers_use_a_guard_flag() {
        let x = param(Type::Int, "x");
        let node = Expr::try_fault(
            Expr::block(vec![Expr::assign(p(&x), Expr::constant(1)), Expr::empty()]),
            Expr::assign(p(&x), Expr::constant(2)),
        );
        assert_eq!(
            method(vec![x], node),
            "public void Main(int x)\n{\n    bool fault1 = true;\n    try\n    {\n        x = 1;\n        fault1 = false;\n    }\n    finally\n    {\n        if (fault1)\n        {\n            x = 2;\n        }\n    }\n}"
        );
    }

    #[test]
    fn value_producing_fault_try_keeps_its_result() {
        let x = param(Type::Int, "x");
        let node = Expr::try_fault(
            Expr::add(p(&x), Expr::constant(1)),
            Expr::assign(p(&x), Expr::constant(2)),
        );
        assert_eq!(
            method(vec![x], node),
            "public int Main(int x)\n{\n    int result1;\n    bool fault1 = true;\n    try\n    {\n        result1 = x + 1;\n        fault1 = false;\n    }\n    finally\n    {\n        if (fault1)\n        {\n            x = 2;\n        }\n    }\n    return result1;\n}"
        );
    }

    #[test]
    fn rethrow_inside_catch() {
        let body = Expr::try_catch(
            Expr::empty(),
            vec![CatchBlock::new(Type::exception(), Expr::rethrow())],
        );
        let script = method(Vec::new(), body);
        assert!(script.contains("catch (Exception)\n    {\n        throw;\n    }"));
    }
}

mod lambdas {
    use super::*;

    #[test]
    fn nested_lambdas_are_promoted() {
        let x = param(Type::Int, "x");
        let y = param(Type::Int, "y");
        let inner = Expr::lambda(vec![y.clone()], Expr::multiply(p(&y), Expr::constant(2)));
        let node = Expr::lambda(vec![x.clone()], Expr::invoke(inner, vec![p(&x)]));
        assert_eq!(
            snippet(&node),
            "public int Main(int x)\n{\n    return func1(x);\n}\n\nprivate int func1(int y)\n{\n    return y * 2;\n}"
        );
    }

    #[test]
    fn a_lambda_used_twice_is_promoted_once() {
        let x = param(Type::Int, "x");
        let y = param(Type::Int, "y");
        let inner = Expr::lambda(vec![y.clone()], Expr::multiply(p(&y), Expr::constant(2)));
        let node = Expr::lambda(
            vec![x.clone()],
            Expr::add(
                Expr::invoke(inner.clone(), vec![p(&x)]),
                Expr::invoke(inner, vec![Expr::constant(1)]),
            ),
        );
        let script = snippet(&node);
        assert!(script.contains("return func1(x) + func1(1);"));
        assert_eq!(script.matches("private int func1").count(), 1);
    }

    #[test]
    fn capturing_lambdas_stay_inline() {
        let x = param(Type::Int, "x");
        let y = param(Type::Int, "y");
        let inner = Expr::lambda(vec![y.clone()], Expr::add(p(&x), p(&y)));
        let node = Expr::lambda(vec![x.clone()], Expr::invoke(inner, vec![Expr::constant(1)]));
        assert_eq!(
            snippet(&node),
            "public int Main(int x)\n{\n    return (new Func<int, int>(y => x + y))(1);\n}"
        );
    }

    #[test]
    fn quoted_lambdas_render_as_arrows() {
        let a = param(Type::Int, "a");
        let b = param(Type::Int, "b");
        let quoted = Lambda::new(vec![a.clone(), b.clone()], Expr::add(p(&a), p(&b)));
        let node = Expr::lambda(Vec::new(), Expr::quote(quoted));
        assert_eq!(
            snippet(&node),
            "public Func<int, int, int> Main()\n{\n    return (a, b) => a + b;\n}"
        );
    }

    #[test]
    fn static_definitions_apply_to_promoted_methods() {
        let y = param(Type::Int, "y");
        let inner = Expr::lambda(vec![y.clone()], p(&y));
        let node = Expr::lambda(Vec::new(), Expr::invoke(inner, vec![Expr::constant(1)]));
        let script = node.to_script(&Definitions::new().with_static(true)).unwrap();
        assert!(script.contains("private static int func1(int y)"));
    }
}

mod dynamic {
    use super::*;

    fn dynamic(binder: Binder, arguments: Vec<Expr>) -> Result<Translation> {
        translate(&Expr::dynamic(binder, arguments, Type::Object), &Definitions::new())
    }

    #[test]
    fn member_access_on_dynamic_receivers() {
        let d = param(Type::Object, "d");
        let translation = dynamic(Binder::GetMember { name: "Name".into() }, vec![p(&d)]).unwrap();
        assert_eq!(translation.script, "d.Name");
        assert!(translation.has_dynamic);
        let set = dynamic(
            Binder::SetMember { name: "Name".into() },
            vec![p(&d), Expr::constant("x")],
        )
        .unwrap();
        assert_eq!(set.script, "d.Name = \"x\"");
    }

    #[test]
    fn indexing_and_invocation() {
        let d = param(Type::Object, "d");
        let i = Expr::constant(0);
        assert_eq!(dynamic(Binder::GetIndex, vec![p(&d), i.clone()]).unwrap().script, "d[0]");
        assert_eq!(
            dynamic(Binder::SetIndex, vec![p(&d), i.clone(), Expr::constant(5)])
                .unwrap()
                .script,
            "d[0] = 5"
        );
        assert_eq!(
            dynamic(Binder::DeleteIndex, vec![p(&d), i.clone()]).unwrap().script,
            "d[0] = null"
        );
        assert_eq!(
            dynamic(Binder::InvokeMember { name: "Run".into() }, vec![p(&d), i.clone()])
                .unwrap()
                .script,
            "d.Run(0)"
        );
        assert_eq!(dynamic(Binder::Invoke, vec![p(&d), i]).unwrap().script, "d(0)");
    }

    #[test]
    fn operations() {
        let a = param(Type::Object, "a");
        let b = param(Type::Object, "b");
        assert_eq!(
            dynamic(Binder::BinaryOperation(NodeKind::Add), vec![p(&a), p(&b)])
                .unwrap()
                .script,
            "a + b"
        );
        assert_eq!(
            dynamic(Binder::UnaryOperation(NodeKind::Negate), vec![p(&a)])
                .unwrap()
                .script,
            "-a"
        );
        assert_eq!(
            dynamic(Binder::Convert { ty: Type::Int }, vec![p(&a)]).unwrap().script,
            "(int)a"
        );
    }

    #[test]
    fn custom_binders_are_rejected() {
        let d = param(Type::Object, "d");
        let err = dynamic(Binder::Custom { name: "PythonBinder".into() }, vec![p(&d)]).unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedBinder { binder } if binder == "PythonBinder"));
    }

    #[test]
    fn too_few_arguments_is_an_invalid_shape() {
        let d = param(Type::Object, "d");
        let err = dynamic(Binder::SetIndex, vec![p(&d), Expr::constant(0)]).unwrap_err();
        assert!(matches!(err, TranslateError::InvalidShape(_)));
    }
}

mod assembly {
    use super::*;

    #[test]
    fn imports_aliases_namespace_and_fields() {
        let settings = HostObject::new(Type::named("App", "Settings"), ());
        let constant = Expr::constant(Value::Object(settings));
        let node = Expr::lambda(Vec::new(), Expr::equal(constant.clone(), constant));
        let defs = Definitions::new()
            .with_namespace("Generated")
            .with_type_name("Program")
            .with_static(true);
        assert_eq!(
            translate(&node, &defs).unwrap().script,
            "using App;\n\nnamespace Generated\n{\n    public static class Program\n    {\n        public static Settings Settings1;\n\n        public static bool Main()\n        {\n            return Settings1 == Settings1;\n        }\n    }\n}"
        );
    }

    #[test]
    fn colliding_type_names_get_aliases() {
        let first = Type::named("App.Models", "Item");
        let second = Type::named("App.Views", "Item");
        let a = param(first, "a");
        let b = param(second, "b");
        let node = Expr::lambda(vec![a, b], Expr::empty());
        let defs = Definitions::new().with_type_name("Program");
        let translation = translate(&node, &defs).unwrap();
        assert!(translation.script.starts_with(
            "using App.Models;\n\nusing Item2 = App.Views.Item;\n\npublic class Program"
        ));
        assert!(translation.script.contains("public void Main(Item a, Item2 b)"));
    }

    #[test]
    fn internal_class_with_bases() {
        let disposable = NamedType::new(Some("System"), "IDisposable").interface().into_type();
        let base = Type::named("App", "ScriptBase");
        let defs = Definitions::new()
            .with_type_name("Script")
            .with_internal(true)
            .implementing(disposable)
            .implementing(base);
        let script = Expr::lambda(Vec::new(), Expr::empty()).to_script(&defs).unwrap();
        assert!(script.contains("internal class Script : ScriptBase, IDisposable\n{"));
    }

    #[test]
    fn snippet_mode_writes_no_fields() {
        let settings = HostObject::new(Type::named("App", "Settings"), ());
        let node = Expr::constant(Value::Object(settings));
        let translation = translate(&node, &Definitions::new()).unwrap();
        assert_eq!(translation.script, "Settings1");
        assert_eq!(translation.fields.len(), 1);
    }

    #[test]
    fn runtime_variables_are_hoisted() {
        let x = param(Type::Int, "x");
        let translation =
            translate(&Expr::runtime_variables(vec![x]), &Definitions::new()).unwrap();
        assert_eq!(translation.script, "RuntimeVariables1");
        assert_eq!(
            translation.fields[0].ty.full_name(),
            "System.Runtime.CompilerServices.IRuntimeVariables"
        );
    }
}

mod debug_markers {
    use super::*;

    fn increment_then_return() -> (Parameter, Expr) {
        let x = param(Type::Int, "x");
        let body = Expr::block(vec![
            Expr::assign(p(&x), Expr::add(p(&x), Expr::constant(1))),
            p(&x),
        ]);
        (x, body)
    }

    #[test]
    fn statements_are_marked_in_snippet_mode() {
        let (x, body) = increment_then_return();
        let node = Expr::lambda(vec![x], body);
        let defs = Definitions::new().with_debug_document("Main.cs");
        let translation = translate(&node, &defs).unwrap();
        assert_eq!(
            translation.markers,
            [
                DebugMarker {
                    start_line: 3,
                    start_column: 5,
                    end_line: 3,
                    end_column: 15,
                    offset: 29,
                },
                DebugMarker {
                    start_line: 4,
                    start_column: 5,
                    end_line: 4,
                    end_column: 14,
                    offset: 44,
                },
            ]
        );
        let Expr::Lambda(rewritten) = &translation.expression else {
            panic!("expected a lambda");
        };
        let Expr::Block(block) = rewritten.body() else {
            panic!("expected a block");
        };
        assert_eq!(block.expressions.len(), 4);
        assert!(matches!(&block.expressions[0], Expr::DebugInfo(info) if info.document == "Main.cs" && info.start_line == 3));
    }

    #[test]
    fn markers_account_for_the_wrapper_and_promoted_methods() {
        let x = param(Type::Int, "x");
        let y = param(Type::Int, "y");
        let inner = Expr::lambda(vec![y.clone()], Expr::multiply(p(&y), Expr::constant(2)));
        let body = Expr::block(vec![
            Expr::assign(p(&x), Expr::invoke(inner, vec![p(&x)])),
            p(&x),
        ]);
        let defs = Definitions::new()
            .with_namespace("Generated")
            .with_type_name("Program")
            .with_debug_document("Program.cs");
        let translation = translate(&Expr::lambda(vec![x], body), &defs).unwrap();
        let mut spans: Vec<&str> = translation
            .markers
            .iter()
            .map(|m| m.slice(&translation.script).unwrap_or_default())
            .collect();
        spans.sort_unstable();
        assert_eq!(spans, ["return x;", "return y * 2;", "x = func1(x);"]);
        for marker in &translation.markers {
            assert_eq!(
                &translation.script[marker.offset..marker.offset + 1],
                &translation.script.lines().nth(marker.start_line - 1).unwrap()
                    [marker.start_column - 1..marker.start_column]
            );
        }
    }

    #[test]
    fn tests_of_branches_are_marked() {
        let x = param(Type::Int, "x");
        let body = Expr::if_then(
            Expr::greater_than(p(&x), Expr::constant(0)),
            Expr::assign(p(&x), Expr::constant(0)),
        );
        let defs = Definitions::new().with_debug_document("Main.cs");
        let translation = translate(&Expr::lambda(vec![x], body), &defs).unwrap();
        let spans: Vec<_> = translation
            .markers
            .iter()
            .filter_map(|m| m.slice(&translation.script))
            .collect();
        assert_eq!(spans, ["x > 0", "x = 0;"]);
    }

    #[test]
    fn existing_sequence_points_are_replaced() {
        let x = param(Type::Int, "x");
        let stale = DebugMarker {
            start_line: 9,
            start_column: 1,
            end_line: 9,
            end_column: 2,
            offset: 0,
        }
        .to_expr("Old.cs");
        let body = Expr::block(vec![stale, p(&x)]);
        let node = Expr::lambda(vec![x], body);
        let plain = translate(&node, &Definitions::new()).unwrap();
        assert_eq!(plain.script, "public int Main(int x)\n{\n    return x;\n}");
        let debug = translate(&node, &Definitions::new().with_debug_document("New.cs")).unwrap();
        assert_eq!(debug.markers.len(), 1);
        let Expr::Lambda(rewritten) = &debug.expression else {
            panic!("expected a lambda");
        };
        let Expr::Block(block) = rewritten.body() else {
            panic!("expected a block");
        };
        assert!(matches!(&block.expressions[0], Expr::DebugInfo(info) if info.document == "New.cs"));
    }
}
