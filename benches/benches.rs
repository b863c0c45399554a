//! benches.rs
use criterion::{criterion_group, criterion_main, Criterion};
use num_rational::BigRational;
use paste::paste;
use symcalc::{Builder, Calculator, ExactCalculator, Expression, Node, ScopeMemory};

fn bench_analyze_liner(c: &mut Criterion) {
    let make_much_operand = |n: usize| (0..=n).map(|_| "x").collect::<Vec<_>>().join("+");
    for n in [1, 10, 100, 1000] {
        let formula = make_much_operand(n);
        c.bench_function(&format!("parse {} operands", n), |b| {
            b.iter(|| { let _ = Expression::<f64>::parse(&formula); })
        });

        let expr = Expression::<f64>::parse(&formula).unwrap();
        let mut scope = ScopeMemory::new();
        scope.define_variable("x", Node::Number(1.0)).unwrap();
        c.bench_function(&format!("eval {} operands", n), |b| {
            b.iter(|| expr.evaluate(&mut scope))
        });
    }
}

fn bench_analyze_nested(c: &mut Criterion) {
    let make_much_nested = |n: usize| {
        let mut formula = "x".to_string();
        for _ in 0..n {
            formula = format!("sin({})", formula);
        }
        formula
    };
    for n in [1, 10, 100, 1000] {
        let formula = make_much_nested(n);
        c.bench_function(&format!("parse {} nested", n), |b| {
            b.iter(|| { let _ = Expression::<f64>::parse(&formula); })
        });

        let expr = Expression::<f64>::parse(&formula).unwrap();
        let mut scope = ScopeMemory::new();
        c.bench_function(&format!("residual {} nested", n), |b| {
            b.iter(|| expr.evaluate(&mut scope))
        });
    }
}

fn bench_analyze_literal(c: &mut Criterion) {
    let make_much_order = |n: usize| {
        let digits = "1234567890";
        digits.repeat((n + 9) / 10)[..n].to_string()
    };
    for n in [1, 10, 100, 1000] {
        let formula = make_much_order(n);
        c.bench_function(&format!("parse {} order literal", n), |b| {
            b.iter(|| { let _ = Expression::<f64>::parse(&formula); })
        });
        c.bench_function(&format!("parse {} order exact literal", n), |b| {
            b.iter(|| { let _ = Expression::<BigRational>::parse(&formula); })
        });
    }
}

fn bench_analyze_paren(c: &mut Criterion) {
    let variables = ('a'..='f').map(|key| (key.to_string(), 1.0f64)).collect::<Vec<_>>();

    for formula in ["(a+b)*(c-d)/(e+f)", "a+b*c-d/e+f"] {
        let mut calc = Builder::new().with_variables(variables.clone()).build().unwrap();
        c.bench_function(&format!("evaluate '{}'", formula), |b| {
            b.iter(|| calc.evaluate(formula))
        });
    }
}

fn bench_analyze_invalid(c: &mut Criterion) {
    let invalid_formulas = [
        "unknown_func(x)",      // residual, not an error
        "1 + (2 * 3",           // forget ')'
        "x ** 2",               // dangling operator
        "1 + @",                // unknown lexeme '@'
    ];

    for formula in &invalid_formulas {
        let mut calc = Calculator::<f64>::new();
        c.bench_function(&format!("evaluate invalid: {}", formula), |b| {
            b.iter(|| { let _ = calc.evaluate(formula); })
        });
    }
}

criterion_group!(bench_analyze,
    bench_analyze_liner,
    bench_analyze_nested,
    bench_analyze_literal,
    bench_analyze_paren,
    bench_analyze_invalid,
);

fn bench_practical_fibonacci(c: &mut Criterion) {
    let mut calc = Builder::<f64>::new()
        .with_definitions(["fib(0) = 0", "fib(1) = 1", "fib(n) = fib(n - 1) + fib(n - 2)"])
        .build()
        .unwrap();
    for n in [5, 10, 15] {
        let call = format!("fib({})", n);
        c.bench_function(&format!("recursive {}", call), |b| {
            b.iter(|| calc.evaluate(&call))
        });
    }
}

fn bench_practical_overflow(c: &mut Criterion) {
    let mut calc = Builder::<f64>::new()
        .with_definitions(["down(n) = down(n - 1)"])
        .build()
        .unwrap();
    c.bench_function("unbounded recursion to overflow", |b| {
        b.iter(|| { let _ = calc.evaluate("down(1)"); })
    });
}

fn bench_practical_polynomial(c: &mut Criterion) {
    let formula = "a0 + a1*x + a2*x^2 + a3*x^3 + a4*x^4";
    let definition = "p(x) = 1 - 2x + 5.25x^2 - 0.03x^3 + x^4";

    let mut calc = Builder::<f64>::new()
        .with_variables([("a0", 1.0), ("a1", -2.0), ("a2", 5.25), ("a3", -0.03), ("a4", 1.0), ("x", 2.4)])
        .build()
        .unwrap();
    c.bench_function(&format!("polynomial '{}'", formula), |b| {
        b.iter(|| calc.evaluate(formula))
    });

    let mut calc = Builder::<f64>::new().with_definitions([definition]).build().unwrap();
    c.bench_function(&format!("polynomial call '{}'", definition), |b| {
        b.iter(|| calc.evaluate("p(2.4)"))
    });

    let mut exact = ExactCalculator::new();
    exact.evaluate(definition).unwrap();
    c.bench_function(&format!("exact polynomial call '{}'", definition), |b| {
        b.iter(|| exact.evaluate("p(2.4)"))
    });
}

fn bench_practical_clauses(c: &mut Criterion) {
    let clauses = (0..50).map(|i| format!("sparse({}) = {}", i, i * i)).collect::<Vec<_>>();
    let mut calc = Builder::<f64>::new()
        .with_definitions(clauses)
        .with_definitions(["sparse(x) = -1"])
        .build()
        .unwrap();
    c.bench_function("first clause of 51", |b| {
        b.iter(|| calc.evaluate("sparse(0)"))
    });
    c.bench_function("fallback clause of 51", |b| {
        b.iter(|| calc.evaluate("sparse(99)"))
    });
}

criterion_group!(bench_practical,
    bench_practical_fibonacci,
    bench_practical_overflow,
    bench_practical_polynomial,
    bench_practical_clauses,
);

macro_rules! compares_one_arity_functions {
    ($( $variant: ident ),* $(,)? ) => {
        paste! {
            $(
                pub fn [<bench_compares_ $variant>](c: &mut Criterion) {
                    let x = 0.5f64;

                    c.bench_function(concat!("direct ", stringify!($variant), "(x)"), |b| {
                        b.iter(|| x.$variant())
                    });

                    let mut calc = Builder::new().with_variables([("x", x)]).build().unwrap();
                    c.bench_function(concat!("evaluated \"", stringify!($variant), "(x)\""), |b| {
                        b.iter(|| calc.evaluate(concat!(stringify!($variant), "(x)")))
                    });
                }
            )*
        }
    };
}

compares_one_arity_functions! {
    sin,    cos,    tan,
    asin,   acos,   atan,
    sinh,   cosh,   tanh,
    sqrt,   abs,    floor,
}

pub fn bench_compares_max(c: &mut Criterion) {
    let values = [4.0f64, 2.0, 8.0, 6.0];

    c.bench_function("direct fold max", |b| {
        b.iter(|| values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    });

    let mut calc = Calculator::<f64>::new();
    c.bench_function(r#"evaluated "max(4, 2, 8, 6)""#, |b| {
        b.iter(|| calc.evaluate("max(4, 2, 8, 6)"))
    });
}

criterion_group!(bench_compare,
    bench_compares_sin,     bench_compares_cos,     bench_compares_tan,
    bench_compares_asin,    bench_compares_acos,    bench_compares_atan,
    bench_compares_sinh,    bench_compares_cosh,    bench_compares_tanh,
    bench_compares_sqrt,    bench_compares_abs,     bench_compares_floor,

    bench_compares_max,
);

criterion_main!{
    bench_analyze,
    bench_practical,
    bench_compare,
}
