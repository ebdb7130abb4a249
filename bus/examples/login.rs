use rusty_bus::{
    Registry,
    widget::{Collection, Toolkit, listener},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let toolkit = Toolkit::<String>::shared();
    let registry = Registry::new();

    let header = Collection::single(&toolkit, toolkit.spawn());
    let sidebar = Collection::of(&toolkit, toolkit.spawn_many(2)?);

    let greet = listener(|ev, args: &[String]| {
        let user = args.first().map_or("someone", String::as_str);
        println!("{} sees {} log in", ev.target(), user);
    });

    registry.subscribe(&header, "login", greet.clone())?;
    registry.subscribe(&sidebar, "login", greet)?;
    registry.subscribe(
        &header,
        "logout",
        listener(|ev, _| println!("{} clears the session", ev.target())),
    )?;

    println!("publish login -> {}", registry.publish_with("login", &["alice".into()]));

    println!("unsubscribe sidebar -> {}", registry.unsubscribe(&sidebar, "login"));
    println!("publish login -> {}", registry.publish_with("login", &["bob".into()]));

    println!("unsubscribe header -> {}", registry.unsubscribe(&header, "login"));
    println!("publish login -> {}", registry.publish("login"));
    println!("publish logout -> {}", registry.publish("logout"));

    Ok(())
}
